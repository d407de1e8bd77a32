pub use self::{
    push::{CallMessage, Claims, PushAction, PushHeader, Urgency},
    subscription::{Keys, Subscription},
};

mod push;
mod subscription;
