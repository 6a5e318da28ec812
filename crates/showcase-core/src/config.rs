use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    connection::ReconnectPolicy, domain::SenderId, errors::Error,
    messaging::paced::PacingConfig, script::DEFAULT_FOOTER, utils::parse_csv, Result,
};

/// Typed configuration, read from the environment (and an optional `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    // Transport
    pub telegram_bot_token: String,

    // Sequencer
    pub blocked_senders: Vec<SenderId>,
    pub script_footer: String,

    // Archive
    pub archive_file: PathBuf,

    // Outbound pacing
    pub pacing: PacingConfig,

    // Connection supervision
    pub reconnect: ReconnectPolicy,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process env in `load`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);
        let get_u64 = |key: &str| get(key).and_then(|s| s.trim().parse::<u64>().ok());

        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
        })?;

        let blocked_senders = parse_csv(get("BLOCKED_SENDERS"))
            .into_iter()
            .map(SenderId)
            .collect();
        let script_footer = get("SCRIPT_FOOTER").unwrap_or_else(|| DEFAULT_FOOTER.to_string());

        let archive_file =
            PathBuf::from(get("ARCHIVE_FILE").unwrap_or_else(|| "messages_received.json".to_string()));

        let pacing = PacingConfig {
            message_interval: get_u64("SEND_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(PacingConfig::default().message_interval),
        };

        let defaults = ReconnectPolicy::default();
        let reconnect = ReconnectPolicy {
            initial_delay: get_u64("RECONNECT_INITIAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_delay),
            max_delay: get_u64("RECONNECT_MAX_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_delay),
            // 0 means unlimited.
            max_attempts: get_u64("RECONNECT_MAX_ATTEMPTS")
                .filter(|n| *n > 0)
                .map(|n| n.min(u32::MAX as u64) as u32),
        };

        Ok(Self {
            telegram_bot_token,
            blocked_senders,
            script_footer,
            archive_file,
            pacing,
            reconnect,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn token_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "  ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn defaults_apply() {
        let cfg = Config::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "t")])).unwrap();
        assert!(cfg.blocked_senders.is_empty());
        assert_eq!(cfg.script_footer, DEFAULT_FOOTER);
        assert_eq!(cfg.archive_file, PathBuf::from("messages_received.json"));
        assert_eq!(cfg.pacing.message_interval, Duration::from_millis(1050));
        assert_eq!(cfg.reconnect.max_attempts, None);
    }

    #[test]
    fn overrides_parse() {
        let cfg = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("BLOCKED_SENDERS", "554699771467@s.whatsapp.net, 42"),
            ("ARCHIVE_FILE", "/var/lib/showcase/archive.json"),
            ("SEND_INTERVAL_MS", "0"),
            ("RECONNECT_MAX_ATTEMPTS", "5"),
            ("RECONNECT_INITIAL_MS", "not-a-number"),
        ]))
        .unwrap();

        assert_eq!(
            cfg.blocked_senders,
            vec![
                SenderId::new("554699771467@s.whatsapp.net"),
                SenderId::new("42")
            ]
        );
        assert_eq!(cfg.archive_file, PathBuf::from("/var/lib/showcase/archive.json"));
        assert_eq!(cfg.pacing.message_interval, Duration::ZERO);
        assert_eq!(cfg.reconnect.max_attempts, Some(5));
        assert_eq!(cfg.reconnect.initial_delay, Duration::from_secs(1));
    }

    #[test]
    fn dotenv_parsing_skips_comments_and_strips_quotes() {
        let parsed = parse_dotenv("# comment\nA=1\n B = \"two\" \nbroken\n='x'\nC='3'\n");
        assert_eq!(
            parsed,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "two".to_string()),
                ("C".to_string(), "3".to_string()),
            ]
        );
    }
}
