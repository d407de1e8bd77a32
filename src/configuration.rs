use std::{
    env, fs,
    str::FromStr,
    io::ErrorKind,
    ops::Deref,
    path::PathBuf,
    sync::Arc,
};

use tokio::sync::Semaphore;
use tracing::info;

use crate::{
    dao::SubscriptionStore, error::Error, mailbox::ReplyMailbox,
    push::PushDelivery, types::Urgency,
};

pub const DEFAULT_CONFIG_FILE: &str = ".env";
pub const DEFAULT_CALL_TITLE: &str = "📢 Mom is calling";
pub const DEFAULT_CALL_BODY: &str = "How long until you come?";

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

pub struct State {
    pub config: Config,
    pub store: SubscriptionStore,
    pub mailbox: ReplyMailbox,
    pub push: Arc<dyn PushDelivery>,
    pub push_permits: Arc<Semaphore>,
}

impl State {
    pub fn new(config: Config, push: Arc<dyn PushDelivery>) -> State {
        let store = SubscriptionStore::new(&config.subscriptions_file);
        let push_permits = Arc::new(Semaphore::new(config.max_tasks.max(1)));

        Self {
            config,
            store,
            mailbox: ReplyMailbox::default(),
            push,
            push_permits,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub static_dir: String,
    pub index_template: String,
    pub subscriptions_file: PathBuf,
    pub upload_dir: PathBuf,
    pub timeout: u64,
    pub max_tasks: usize,
    pub push_ttl: i64,
    pub push_urgency: Urgency,
    pub max_audio_bytes: usize,
    pub status_code_to_delete: Vec<u16>,
    pub mail_to: String,
    pub vapid_private_key: Vec<u8>,
    pub vapid_public_key: String,
    pub call_title: String,
    pub call_body: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: String::from("0.0.0.0"),
            port: 5000,
            allowed_origins: vec![String::from("*")],
            static_dir: String::from("static"),
            index_template: String::from("templates/index.html"),
            subscriptions_file: PathBuf::from("subscriptions.json"),
            upload_dir: PathBuf::from("static/uploads"),
            timeout: 10,
            max_tasks: 16,
            push_ttl: 60,
            push_urgency: Urgency::High,
            max_audio_bytes: 10 * 1024 * 1024,
            status_code_to_delete: vec![410],
            mail_to: String::from("test@localhost.com"),
            vapid_private_key: vec![],
            vapid_public_key: String::new(),
            call_title: String::from(DEFAULT_CALL_TITLE),
            call_body: String::from(DEFAULT_CALL_BODY),
        }
    }
}

fn parse_config_vapid_keys(
    private_key_path: &str,
    public_key_path: &str,
) -> Result<(Vec<u8>, String), Error> {
    let private_key = fs::read(private_key_path).map_err(|e| {
        Error::ConfigurationError(format!("{}: {}", private_key_path, e))
    })?;
    let public_key = fs::read_to_string(public_key_path).map_err(|e| {
        Error::ConfigurationError(format!("{}: {}", public_key_path, e))
    })?;

    Ok((private_key, public_key.trim().to_owned()))
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_owned())
        .collect()
}

fn parse_status_codes(value: &str) -> Result<Vec<u16>, Error> {
    let mut codes = vec![];
    for code in parse_list(value) {
        codes.push(code.parse::<u16>()?);
    }
    Ok(codes)
}

fn parse_urgency(value: &str) -> Result<Urgency, Error> {
    Urgency::from_str(value).map_err(|e| {
        Error::ConfigurationError(format!("PUSH_URGENCY {}: {}", value, e))
    })
}

pub fn get_configuration() -> Result<Config, Error> {
    let defaults = Config::default();

    let server_host = var_or("SERVER_HOST", &defaults.server_host);
    let port = var_or("PORT", &defaults.port.to_string()).parse()?;
    let allowed_origins = parse_list(&var_or(
        "ALLOWED_ORIGINS",
        &defaults.allowed_origins.join(","),
    ));
    let static_dir = var_or("STATIC_DIR", &defaults.static_dir);
    let index_template = var_or("INDEX_TEMPLATE", &defaults.index_template);
    let subscriptions_file = PathBuf::from(var_or(
        "SUBSCRIPTIONS_FILE",
        &defaults.subscriptions_file.to_string_lossy(),
    ));
    let upload_dir = PathBuf::from(var_or(
        "UPLOAD_DIR",
        &defaults.upload_dir.to_string_lossy(),
    ));
    let timeout = var_or("TIMEOUT", &defaults.timeout.to_string()).parse()?;
    let max_tasks =
        var_or("MAX_TASKS", &defaults.max_tasks.to_string()).parse()?;
    let push_ttl =
        var_or("PUSH_TTL", &defaults.push_ttl.to_string()).parse()?;
    let push_urgency = parse_urgency(&var_or(
        "PUSH_URGENCY",
        &defaults.push_urgency.to_string(),
    ))?;
    let max_audio_bytes =
        var_or("MAX_AUDIO_BYTES", &defaults.max_audio_bytes.to_string())
            .parse()?;
    let status_code_to_delete =
        parse_status_codes(&var_or("STATUS_CODE_TO_DELETE", "410"))?;
    let mail_to = var_or("MAIL_TO", &defaults.mail_to);
    let call_title = var_or("CALL_TITLE", DEFAULT_CALL_TITLE);
    let call_body = var_or("CALL_BODY", DEFAULT_CALL_BODY);

    let (vapid_private_key, vapid_public_key) = parse_config_vapid_keys(
        &var_or("VAPID_PRIVATE_KEY_PATH", "cert/vapid_private.pem"),
        &var_or("VAPID_PUBLIC_KEY_PATH", "cert/vapid_public.b64"),
    )?;

    let config = Config {
        server_host,
        port,
        allowed_origins,
        static_dir,
        index_template,
        subscriptions_file,
        upload_dir,
        timeout,
        max_tasks,
        push_ttl,
        push_urgency,
        max_audio_bytes,
        status_code_to_delete,
        mail_to,
        vapid_private_key,
        vapid_public_key,
        call_title,
        call_body,
    };

    Ok(config)
}

/// Exports every `KEY=value` line of the config file into the environment.
/// A missing file leaves the environment untouched.
pub fn set_configuration() -> Result<(), Error> {
    let path = var_or("CONFIG_FILE", DEFAULT_CONFIG_FILE);

    let config_string = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("Config file {} not found, using environment", path);
            return Ok(());
        },
        Err(e) => return Err(Error::Io(e)),
    };

    for (key, value) in parse_config_string(&config_string) {
        env::set_var(key, value);
    }

    Ok(())
}

fn parse_config_string(config: &str) -> Vec<(String, String)> {
    config
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_at(line.find('=')?);
            Some((key.trim().to_owned(), value[1..].trim().to_owned()))
        })
        .collect()
}
