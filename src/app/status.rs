use formguard::Config;

pub fn render_status(config: &Config) -> String {
    let secret = if config.verify_secret().is_some() {
        "configured"
    } else {
        "missing"
    };
    let site_key = config.verify.site_key.as_deref().unwrap_or("(unset)");
    let cors = if config.gateway.cors_origins.is_empty() {
        "(none)".to_string()
    } else {
        config.gateway.cors_origins.join(", ")
    };

    let lines = [
        "◆ formguard status".to_string(),
        String::new(),
        format!("Version     {}", env!("CARGO_PKG_VERSION")),
        format!("Config      {}", config.config_path.display()),
        String::new(),
        format!(
            "Gateway     {}:{}{}",
            config.gateway.host, config.gateway.port, config.gateway.verify_route
        ),
        format!("  public    {}", config.gateway.allow_public_bind),
        format!("  cors      {cors}"),
        String::new(),
        format!("Provider    {}", config.verify.siteverify_url),
        format!("  secret    {secret}"),
        format!("  site key  {site_key}"),
        format!("  threshold {}", config.verify.score_threshold),
        format!("  timeout   {}s", config.verify.timeout_secs),
        String::new(),
        format!("Form        action={}", config.form.action),
        format!("  cooldown  {}ms", config.form.submit_timeout_ms),
        format!("  reset     {}", config.form.reset),
        format!("  endpoint  {}", config.form.endpoint_url),
    ];
    lines.join("\n")
}
