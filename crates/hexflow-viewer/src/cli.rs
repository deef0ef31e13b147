use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "hexflow")]
#[command(about = "Animated rainbow pipes over a hexagon honeycomb", long_about = None)]
pub struct Cli {
    /// Window title
    #[arg(long, default_value = "hexflow")]
    pub title: String,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 720.0)]
    pub width: f64,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720.0)]
    pub height: f64,

    /// Width/height ratio kept by the letterboxed viewport
    #[arg(long, default_value_t = 1.0, value_parser = parse_aspect)]
    pub aspect: f32,

    /// Log filter in env_logger syntax (overrides RUST_LOG)
    #[arg(long = "log-filter")]
    pub log_filter: Option<String>,

    /// Present without waiting for vblank
    #[arg(long = "no-vsync")]
    pub no_vsync: bool,
}

fn parse_aspect(raw: &str) -> Result<f32, String> {
    let aspect: f32 = raw.parse().map_err(|e| format!("{e}"))?;
    if aspect.is_finite() && aspect > 0.0 {
        Ok(aspect)
    } else {
        Err(format!("aspect must be a positive number, got {raw}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["hexflow"]);
        assert_eq!(cli.title, "hexflow");
        assert_eq!(cli.aspect, 1.0);
        assert_eq!((cli.width, cli.height), (720.0, 720.0));
        assert!(cli.log_filter.is_none());
        assert!(!cli.no_vsync);
    }

    #[test]
    fn flags() {
        let cli = Cli::parse_from([
            "hexflow",
            "--aspect",
            "1.5",
            "--log-filter",
            "debug",
            "--no-vsync",
            "--width",
            "1024",
        ]);
        assert_eq!(cli.aspect, 1.5);
        assert_eq!(cli.log_filter.as_deref(), Some("debug"));
        assert!(cli.no_vsync);
        assert_eq!(cli.width, 1024.0);
    }

    #[test]
    fn rejects_non_positive_aspect() {
        assert!(Cli::try_parse_from(["hexflow", "--aspect", "0"]).is_err());
        assert!(Cli::try_parse_from(["hexflow", "--aspect", "-2"]).is_err());
        assert!(Cli::try_parse_from(["hexflow", "--aspect", "wide"]).is_err());
    }
}
