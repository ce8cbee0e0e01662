use crate::code::normalize_task;
use crate::error::{Result, TrainlogError};
use crate::milestone::{self, MilestoneRule};
use crate::paths;
use crate::phase::SkillTestSet;
use crate::types::TaskStatus;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SchoolConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolConfig {
    pub name: String,
}

impl Default for SchoolConfig {
    fn default() -> Self {
        Self {
            name: "flight-school".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub school: SchoolConfig,
    /// Accepted spellings of the regulatory skill-test task.
    #[serde(default = "default_skill_tests")]
    pub skill_tests: Vec<String>,
    /// Evaluated in file order.
    #[serde(default = "milestone::default_rules")]
    pub milestones: Vec<MilestoneRule>,
    /// Cohort name -> program type.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub cohorts: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}

fn default_skill_tests() -> Vec<String> {
    vec![
        "PPL (A) SKILL TEST".to_string(),
        "PPL(A) SKILL TEST".to_string(),
        "PPL SKILL TEST".to_string(),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            school: SchoolConfig::default(),
            skill_tests: default_skill_tests(),
            milestones: milestone::default_rules(),
            cohorts: HashMap::new(),
        }
    }
}

impl Config {
    pub fn new(school_name: impl Into<String>) -> Self {
        Self {
            school: SchoolConfig {
                name: school_name.into(),
            },
            ..Self::default()
        }
    }

    pub fn skill_test_set(&self) -> SkillTestSet {
        SkillTestSet::new(&self.skill_tests)
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(TrainlogError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load the project config, or the built-in defaults when none exists.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(TrainlogError::NotInitialized) => {
                tracing::debug!(root = %root.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Reject a config whose `validate` reports any error-level problem.
    /// Warnings are logged and let through.
    pub fn ensure_valid(self) -> Result<Self> {
        let mut errors = Vec::new();
        for w in self.validate() {
            match w.level {
                WarnLevel::Error => errors.push(w.message),
                WarnLevel::Warning => tracing::warn!("config: {}", w.message),
            }
        }
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(TrainlogError::InvalidConfig(errors.join("; ")))
        }
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let warn = |level: WarnLevel, message: String| ConfigWarning { level, message };

        // 1. Skill-test spellings
        if self.skill_tests.iter().all(|s| normalize_task(Some(s)).is_empty()) {
            warnings.push(warn(
                WarnLevel::Warning,
                "no skill-test spellings configured; phase completion will cover every task"
                    .to_string(),
            ));
        }

        let fixed: HashSet<&str> = TaskStatus::fixed().iter().map(|s| s.as_str()).collect();
        let mut seen_ids = HashSet::new();
        for rule in &self.milestones {
            // 2. Duplicate rule ids
            if !seen_ids.insert(rule.id.as_str()) {
                warnings.push(warn(
                    WarnLevel::Warning,
                    format!("milestone '{}' is defined more than once", rule.id),
                ));
            }

            // 3. Groups and thresholds
            if rule.task_group.is_empty() {
                warnings.push(warn(
                    WarnLevel::Error,
                    format!("milestone '{}' has an empty task group", rule.id),
                ));
            }
            if rule.group().len() < rule.task_group.len() {
                warnings.push(warn(
                    WarnLevel::Warning,
                    format!(
                        "milestone '{}' lists the same task more than once after normalization",
                        rule.id
                    ),
                ));
            }
            if rule.threshold_hours.is_nan() || rule.threshold_hours <= 0.0 {
                warnings.push(warn(
                    WarnLevel::Error,
                    format!(
                        "milestone '{}' has non-positive threshold {}",
                        rule.id, rule.threshold_hours
                    ),
                ));
            }

            // 4. Labels must stay distinguishable from the fixed taxonomy
            if rule.result_label.trim().is_empty() {
                warnings.push(warn(
                    WarnLevel::Error,
                    format!("milestone '{}' has an empty result label", rule.id),
                ));
            } else if fixed.contains(rule.result_label.as_str()) {
                warnings.push(warn(
                    WarnLevel::Error,
                    format!(
                        "milestone '{}' label '{}' collides with a built-in status",
                        rule.id, rule.result_label
                    ),
                ));
            }

            // 5. Program types that no cohort maps to
            if let Some(types) = &rule.program_types {
                if types.is_empty() {
                    warnings.push(warn(
                        WarnLevel::Warning,
                        format!(
                            "milestone '{}' has an empty program type list and never applies",
                            rule.id
                        ),
                    ));
                }
                if !self.cohorts.is_empty() {
                    for pt in types {
                        let known = self
                            .cohorts
                            .values()
                            .any(|v| v.trim().eq_ignore_ascii_case(pt.trim()));
                        if !known {
                            warnings.push(warn(
                                WarnLevel::Warning,
                                format!(
                                    "milestone '{}' targets program type '{}' which no cohort uses",
                                    rule.id, pt
                                ),
                            ));
                        }
                    }
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new("aero-academy");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.school.name, "aero-academy");
        assert_eq!(parsed.milestones, cfg.milestones);
        assert_eq!(parsed.skill_tests, cfg.skill_tests);
    }

    #[test]
    fn minimal_yaml_gets_defaults() {
        let cfg: Config = serde_yaml::from_str("school:\n  name: x\n").unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.milestones.len(), 4);
        assert!(cfg.skill_test_set().contains("PPL (A) SKILL TEST"));
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(TrainlogError::NotInitialized)
        ));
        let cfg = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(cfg.milestones.len(), 4);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("x");
        cfg.cohorts.insert("2025-A".into(), "MPL".into());
        cfg.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.cohorts.get("2025-A").map(String::as_str), Some("MPL"));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_rules() {
        let mut cfg = Config::default();
        cfg.skill_tests.clear();
        cfg.milestones.push(MilestoneRule {
            id: "bad".into(),
            program_types: Some(vec!["MODULER".into()]),
            task_group: vec![],
            threshold_hours: 0.0,
            result_label: "Done".into(),
        });
        cfg.cohorts.insert("2025-A".into(), "MPL".into());

        let warnings = cfg.validate();
        let errors = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .count();
        assert_eq!(errors, 3);
        assert!(warnings.iter().any(|w| w.message.contains("skill-test")));
        assert!(warnings.iter().any(|w| w.message.contains("'MODULER'")));
    }

    #[test]
    fn nan_threshold_is_an_error() {
        let mut cfg = Config::default();
        cfg.milestones[0].threshold_hours = f64::NAN;
        assert!(cfg
            .validate()
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("non-positive threshold")));
    }

    #[test]
    fn ensure_valid_rejects_error_level_problems() {
        assert!(Config::default().ensure_valid().is_ok());

        let mut cfg = Config::default();
        cfg.milestones[1].threshold_hours = -1.0;
        match cfg.ensure_valid() {
            Err(TrainlogError::InvalidConfig(msg)) => {
                assert!(msg.contains("'entegre_cpl' has non-positive threshold"))
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn validate_flags_duplicate_group_entries() {
        let mut cfg = Config::default();
        cfg.milestones[0].task_group.push("mpl basic 01".into());
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("more than once after normalization")));
    }
}
