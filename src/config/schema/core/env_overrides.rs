use super::Config;

fn first_non_empty(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_owned())
        .find(|value| !value.is_empty())
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(secret) = first_non_empty(&["FORMGUARD_SECRET_KEY", "RECAPTCHA_SECRET_KEY"]) {
            self.verify.secret = Some(secret);
        }

        if let Some(site_key) = first_non_empty(&[
            "FORMGUARD_SITE_KEY",
            "RECAPTCHA_SITE_KEY",
            "NEXT_PUBLIC_RECAPTCHA_SITE_KEY",
        ]) {
            self.verify.site_key = Some(site_key);
        }

        if let Some(url) = first_non_empty(&["FORMGUARD_SITEVERIFY_URL"]) {
            self.verify.siteverify_url = url;
        }

        if let Some(threshold_str) = first_non_empty(&["FORMGUARD_SCORE_THRESHOLD"])
            && let Ok(threshold) = threshold_str.parse::<f64>()
            && (0.0..=1.0).contains(&threshold)
        {
            self.verify.score_threshold = threshold;
        }

        if let Some(port_str) = first_non_empty(&["FORMGUARD_GATEWAY_PORT", "PORT"])
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Some(host) = first_non_empty(&["FORMGUARD_GATEWAY_HOST", "HOST"]) {
            self.gateway.host = host;
        }

        if let Some(endpoint) = first_non_empty(&["FORMGUARD_ENDPOINT_URL"]) {
            self.form.endpoint_url = endpoint;
        }
    }
}
