pub use subscription::SubscriptionStore;

mod subscription;
