use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::domain::config_error::ConfigError;
use crate::config::domain::settings_document::SettingsDocument;
use crate::shared::constants::{CONFIG_DIR_NAME, CONFIG_ENV_VAR, CONFIG_FILE_NAME, OCIO_ENV_VAR};

/// Locate the settings file.
///
/// Resolution order:
/// 1. Explicit path (command line)
/// 2. `$DAILIES_CONFIG`
/// 3. `<user config dir>/dailies/dailies.yaml`
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let from_env = env::var_os(CONFIG_ENV_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    pick_config_path(explicit, from_env, dirs::config_dir())
}

fn pick_config_path(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = from_env {
        return Ok(path);
    }
    config_dir
        .map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigPath)
}

/// Read and parse a settings file. `.json` files are parsed as JSON,
/// anything else as YAML. `$OCIO` fills in a missing `ocioconfig`.
pub fn load(path: &Path) -> Result<SettingsDocument, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse(path, &text)?;
    let ocio = env::var_os(OCIO_ENV_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    Ok(with_ocio_fallback(document, ocio))
}

pub fn parse(path: &Path, text: &str) -> Result<SettingsDocument, ConfigError> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let parsed = if is_json {
        serde_json::from_str(text).map_err(|e| e.to_string())
    } else if text.trim().is_empty() {
        Ok(SettingsDocument::default())
    } else {
        serde_yaml::from_str(text).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

fn with_ocio_fallback(mut document: SettingsDocument, ocio: Option<PathBuf>) -> SettingsDocument {
    if document.globals.ocioconfig.is_none() {
        document.globals.ocioconfig = ocio;
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_explicit_path_wins() {
        let path = pick_config_path(
            Some(Path::new("/tmp/a.yaml")),
            Some(PathBuf::from("/tmp/b.yaml")),
            Some(PathBuf::from("/home/u/.config")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/a.yaml"));
    }

    #[test]
    fn test_env_before_config_dir() {
        let path = pick_config_path(
            None,
            Some(PathBuf::from("/tmp/b.yaml")),
            Some(PathBuf::from("/home/u/.config")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/b.yaml"));
    }

    #[test]
    fn test_config_dir_fallback() {
        let path = pick_config_path(None, None, Some(PathBuf::from("/home/u/.config"))).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/.config/dailies/dailies.yaml"));
        assert!(matches!(
            pick_config_path(None, None, None),
            Err(ConfigError::NoConfigPath)
        ));
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "globals:\n  width: 1280\n  ocioconfig: /show/config.ocio\noutput_codecs:\n  h264_hq:\n    codec: libx264"
        )
        .unwrap();

        let doc = load(file.path()).unwrap();

        assert_eq!(doc.globals.width, 1280);
        assert_eq!(doc.codec_names(), vec!["h264_hq"]);
        assert_eq!(
            doc.globals.ocioconfig,
            Some(PathBuf::from("/show/config.ocio"))
        );
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"globals": {{"height": 720}}, "output_codecs": {{"dnxhd": {{"codec": "dnxhd", "bitrate": 36000000}}}}}}"#
        )
        .unwrap();

        let doc = load(file.path()).unwrap();

        assert_eq!(doc.globals.height, 720);
        assert_eq!(
            doc.output_codecs["dnxhd"].bitrate.as_deref(),
            Some("36000000")
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(load(&missing), Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = parse(Path::new("bad.yaml"), "globals: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_ocio_fills_only_missing_config() {
        let doc = with_ocio_fallback(
            SettingsDocument::default(),
            Some(PathBuf::from("/env/config.ocio")),
        );
        assert_eq!(
            doc.globals.ocioconfig,
            Some(PathBuf::from("/env/config.ocio"))
        );

        let mut explicit = SettingsDocument::default();
        explicit.globals.ocioconfig = Some(PathBuf::from("/show/config.ocio"));
        let doc = with_ocio_fallback(explicit, Some(PathBuf::from("/env/config.ocio")));
        assert_eq!(
            doc.globals.ocioconfig,
            Some(PathBuf::from("/show/config.ocio"))
        );
    }
}
