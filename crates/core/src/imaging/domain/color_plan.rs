use std::path::PathBuf;

use crate::config::domain::config_error::ConfigError;
use crate::config::domain::global_settings::GlobalSettings;

/// One color-management step, run by the external engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColorOperation {
    /// Color space conversion from a named space to the view's space.
    Convert { from: String, to: String },
    /// Apply one or more looks, ending in `space`.
    Look { looks: String, space: String },
    /// Display/view transform to display-referred values.
    Display { display: String, view: String },
}

/// The ordered color operations for a run and the config that defines the
/// names they use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorPlan {
    pub config: PathBuf,
    pub operations: Vec<ColorOperation>,
}

impl ColorPlan {
    /// Builds the plan in fixed order: conversion, look, display.
    ///
    /// Conversion and look need a view to land in; a display transform
    /// without a view is skipped. Returns `None` when no color step is
    /// configured.
    pub fn from_settings(globals: &GlobalSettings) -> Result<Option<Self>, ConfigError> {
        let view = globals.ocioview.as_deref();
        let need_view = |stage: &str| {
            view.map(str::to_string).ok_or_else(|| {
                ConfigError::invalid(format!("{stage} is configured but ocioview is not set"))
            })
        };

        let mut operations = Vec::new();
        if let Some(from) = &globals.ociocolorconvert {
            operations.push(ColorOperation::Convert {
                from: from.clone(),
                to: need_view("ociocolorconvert")?,
            });
        }
        if let Some(looks) = &globals.ociolook {
            operations.push(ColorOperation::Look {
                looks: looks.clone(),
                space: need_view("ociolook")?,
            });
        }
        if let Some(display) = &globals.ociodisplay {
            match view {
                Some(view) => operations.push(ColorOperation::Display {
                    display: display.clone(),
                    view: view.to_string(),
                }),
                None => log::warn!("ociodisplay {display} has no ocioview. Skipping display transform"),
            }
        }

        if operations.is_empty() {
            return Ok(None);
        }
        let config = globals.ocioconfig.clone().ok_or_else(|| {
            ConfigError::invalid("color operations are configured but no ocioconfig or $OCIO is set")
        })?;
        Ok(Some(Self { config, operations }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn globals() -> GlobalSettings {
        GlobalSettings {
            ocioconfig: Some(PathBuf::from("/show/config.ocio")),
            ..GlobalSettings::default()
        }
    }

    #[test]
    fn test_no_color_settings_means_no_plan() {
        assert_eq!(ColorPlan::from_settings(&globals()).unwrap(), None);
    }

    #[test]
    fn test_operations_run_in_fixed_order() {
        let settings = GlobalSettings {
            ociocolorconvert: Some("ACES - ACEScg".into()),
            ociolook: Some("shot_grade".into()),
            ociodisplay: Some("sRGB".into()),
            ocioview: Some("Film".into()),
            ..globals()
        };
        let plan = ColorPlan::from_settings(&settings).unwrap().unwrap();
        assert_eq!(plan.config, PathBuf::from("/show/config.ocio"));
        assert_eq!(
            plan.operations,
            vec![
                ColorOperation::Convert {
                    from: "ACES - ACEScg".into(),
                    to: "Film".into()
                },
                ColorOperation::Look {
                    looks: "shot_grade".into(),
                    space: "Film".into()
                },
                ColorOperation::Display {
                    display: "sRGB".into(),
                    view: "Film".into()
                },
            ]
        );
    }

    #[test]
    fn test_display_without_view_is_skipped() {
        let settings = GlobalSettings {
            ociodisplay: Some("sRGB".into()),
            ..globals()
        };
        assert_eq!(ColorPlan::from_settings(&settings).unwrap(), None);
    }

    #[test]
    fn test_convert_without_view_is_an_error() {
        let settings = GlobalSettings {
            ociocolorconvert: Some("linear".into()),
            ..globals()
        };
        assert!(ColorPlan::from_settings(&settings).is_err());
    }

    #[test]
    fn test_operations_without_config_are_an_error() {
        let settings = GlobalSettings {
            ociodisplay: Some("sRGB".into()),
            ocioview: Some("Film".into()),
            ..GlobalSettings::default()
        };
        assert!(matches!(
            ColorPlan::from_settings(&settings),
            Err(ConfigError::Invalid(_))
        ));
    }
}
