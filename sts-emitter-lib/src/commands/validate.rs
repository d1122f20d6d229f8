use super::Host;
use super::common::ConfigArgs;
use super::config::Config;
use crate::Result;
use crate::binding::BindError;
use crate::expr::{Environment, is_empty_sentinel};
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug, Clone, Default)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Loads the configuration and compiles every template
///
/// Compilation catches syntax errors and references to anything other than
/// `body` or a known function. Type errors only surface at evaluation time.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or a template does not compile
fn validate_config_inner(args: &ValidateArgs) -> Result<Config> {
    let config = Config::load(&args.config)?;
    let environment = Environment::new();

    let templates = config
        .event
        .expressions()
        .chain(core::iter::once(("metric_name".to_string(), config.metric_name.as_str())));

    for (field, template) in templates {
        if is_empty_sentinel(template) {
            continue;
        }

        let _ = environment.compile(template.trim()).map_err(|e| BindError::new(field, e))?;
    }

    Ok(config)
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    match validate_config_inner(args) {
        Ok(config) => {
            let _ = writeln!(host.output(), "Configuration is valid");
            if let Some(path) = &args.config.config {
                let _ = writeln!(host.output(), "Config file: {path}");
            }
            let _ = writeln!(host.output(), "Receiver: {}", config.api_url);
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use crate::commands::init::{InitArgs, init_config};
    use camino::Utf8PathBuf;

    fn args_for(path: Utf8PathBuf) -> ValidateArgs {
        ValidateArgs {
            config: ConfigArgs {
                config: Some(path),
                ..ConfigArgs::default()
            },
        }
    }

    fn write_config(dir: &tempfile::TempDir, name: &str, content: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::try_from(dir.path().join(name)).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_default_config_is_valid() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = Utf8PathBuf::try_from(tmp.path().join("sts-emitter.toml")).unwrap();

        let mut init_host = TestHost::new();
        let init_args = InitArgs {
            output: Some(config_path.clone()),
        };
        init_config(&mut init_host, &init_args).unwrap();

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &args_for(config_path));
        assert!(result.is_ok(), "default configuration should validate: {result:?}");

        let output = String::from_utf8(host.output_buf).unwrap();
        assert!(output.contains("Configuration is valid"));
        assert!(output.contains("http://localhost:7077"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_invalid_toml_syntax() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, "invalid.toml", "[event\ntitle = \"'x'\"\n");

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &args_for(path));
        assert!(result.is_err());
        assert!(String::from_utf8(host.error_buf).unwrap().contains("Configuration validation failed"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_unknown_field() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            &tmp,
            "unknown.toml",
            "api_url = \"http://localhost\"\napi_key = \"k\"\n[event]\nseverity = \"'high'\"\n",
        );

        let mut host = TestHost::new();
        assert!(validate_config(&mut host, &args_for(path)).is_err());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_invalid_expression_syntax() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            &tmp,
            "bad_expr.toml",
            "api_url = \"http://localhost\"\napi_key = \"k\"\n[event]\ntitle = \"this is not CEL !!!\"\n",
        );

        let mut host = TestHost::new();
        let err = validate_config(&mut host, &args_for(path)).unwrap_err();
        assert!(err.to_string().contains("title"), "{err}");
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_unknown_variable() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            &tmp,
            "unknown_var.toml",
            "api_url = \"http://localhost\"\napi_key = \"k\"\n[event]\ntags = [\"'ok'\", \"event.name\"]\n",
        );

        let mut host = TestHost::new();
        let err = validate_config(&mut host, &args_for(path)).unwrap_err();
        assert!(err.to_string().contains("tags[1]"), "{err}");
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_metric_name_is_checked() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            &tmp,
            "metric.toml",
            "api_url = \"http://localhost\"\napi_key = \"k\"\nmetric_name = \"nosuchfn(body.x)\"\n",
        );

        let mut host = TestHost::new();
        let err = validate_config(&mut host, &args_for(path)).unwrap_err();
        assert!(err.to_string().contains("metric_name"), "{err}");
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_body_references_are_valid() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            &tmp,
            "body.toml",
            r#"
api_url = "https://sts.example.com"
api_key = "k"
metric_name = "'emitter.presence'"

[event]
title = "body.name + ' failed'"
text = "''"
identifier = "'urn:host:' + body.host.lowerAscii()"
tags = ["'env:' + body.env", "  "]
"#,
        );

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &args_for(path));
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn test_missing_connection_settings() {
        let mut host = TestHost::new();
        let args = ValidateArgs {
            config: ConfigArgs {
                api_key: Some("k".to_string()),
                ..ConfigArgs::default()
            },
        };
        let err = validate_config(&mut host, &args).unwrap_err();
        assert!(err.to_string().contains("api_url"), "{err}");
    }
}
