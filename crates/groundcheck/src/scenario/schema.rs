//! Scenario YAML schema.
//!
//! ```yaml
//! name: take_off
//! description: Take off and wait until the UAS is flying
//! steps:
//!   - action: click
//!     object: gCS_buttonRect_Rectangle
//!     x: 146
//!     y: 60
//!   - action: drag
//!     object: gCS_Text
//!     x: 6
//!     y: 8
//!     dx: 662
//!     dy: 36
//!   - action: wait
//!     seconds: 6
//!     until:
//!       object: gCS_Flying_Text
//!   - action: assert_equals
//!     object: gCS_Flying_Text
//!     property: text
//!     expected: Flying
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::event::{Modifier, MouseButton, MouseEvent};
use crate::object_map::{AttrValue, ObjectMap, KNOWN_ATTRIBUTES};
use crate::result::{GroundcheckError, GroundcheckResult};
use crate::widget::Point;

/// Longest wait a step may record, in seconds
pub const MAX_WAIT_SECONDS: f64 = 3600.0;

/// Condition a `wait` can poll for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    /// Object that must resolve
    pub object: String,
    /// Property to compare once resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Value the property must equal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<AttrValue>,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.property, &self.equals) {
            (Some(property), Some(value)) => write!(f, "{}.{property} == {value}", self.object),
            _ => write!(f, "{} exists", self.object),
        }
    }
}

/// One scenario step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Click inside a widget
    Click {
        /// Target object
        object: String,
        /// X offset inside the widget
        x: i32,
        /// Y offset inside the widget
        y: i32,
        /// Mouse button
        #[serde(default)]
        button: MouseButton,
    },
    /// Press inside a widget, move, release
    Drag {
        /// Target object
        object: String,
        /// Start X offset inside the widget
        x: i32,
        /// Start Y offset inside the widget
        y: i32,
        /// Horizontal displacement
        dx: i32,
        /// Vertical displacement
        dy: i32,
        /// Keyboard modifier held
        #[serde(default)]
        modifier: Modifier,
        /// Mouse button
        #[serde(default)]
        button: MouseButton,
    },
    /// Let time pass, optionally until a condition holds
    #[serde(alias = "snooze")]
    Wait {
        /// Recorded duration
        seconds: f64,
        /// Condition that ends the wait early
        #[serde(default, skip_serializing_if = "Option::is_none")]
        until: Option<Condition>,
    },
    /// Compare a property with a literal
    AssertEquals {
        /// Object to inspect
        object: String,
        /// Property name
        property: String,
        /// Expected value
        expected: AttrValue,
    },
}

impl Step {
    /// Objects the step refers to
    #[must_use]
    pub fn objects(&self) -> Vec<&str> {
        match self {
            Self::Click { object, .. }
            | Self::Drag { object, .. }
            | Self::AssertEquals { object, .. } => vec![object.as_str()],
            Self::Wait { until, .. } => until.iter().map(|c| c.object.as_str()).collect(),
        }
    }

    /// Mouse event for input steps
    #[must_use]
    pub fn event(&self) -> Option<MouseEvent> {
        match *self {
            Self::Click { x, y, button, .. } => Some(MouseEvent::Click {
                at: Point::new(x, y),
                button,
            }),
            Self::Drag {
                x,
                y,
                dx,
                dy,
                modifier,
                button,
                ..
            } => Some(MouseEvent::Drag {
                from: Point::new(x, y),
                delta: Point::new(dx, dy),
                modifier,
                button,
            }),
            Self::Wait { .. } | Self::AssertEquals { .. } => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click { object, .. } | Self::Drag { object, .. } => {
                let event = self.event().ok_or(fmt::Error)?;
                write!(f, "{event} on {object}")
            }
            Self::Wait { seconds, until } => match until {
                Some(condition) => write!(f, "wait up to {seconds}s until {condition}"),
                None => write!(f, "wait {seconds}s"),
            },
            Self::AssertEquals {
                object,
                property,
                expected,
            } => write!(f, "assert {object}.{property} == {expected}"),
        }
    }
}

/// A recorded user journey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name
    pub name: String,
    /// What the scenario checks
    #[serde(default)]
    pub description: String,
    /// Steps, run top to bottom
    pub steps: Vec<Step>,
}

fn check_property(scenario: &str, property: &str) -> GroundcheckResult<()> {
    if KNOWN_ATTRIBUTES.contains(&property) {
        Ok(())
    } else {
        Err(GroundcheckError::invalid_scenario(
            scenario,
            format!("property '{property}' cannot be read"),
        ))
    }
}

impl Scenario {
    /// Parse a scenario from YAML
    pub fn from_yaml(yaml: &str) -> GroundcheckResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a scenario file
    pub fn load(path: &Path) -> GroundcheckResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> GroundcheckResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check the scenario against an object map
    pub fn validate(&self, map: &ObjectMap) -> GroundcheckResult<()> {
        let fail = |message: String| GroundcheckError::invalid_scenario(&self.name, message);
        if self.name.trim().is_empty() {
            return Err(fail("name is empty".to_string()));
        }
        if self.steps.is_empty() {
            return Err(fail("no steps".to_string()));
        }
        for (i, step) in self.steps.iter().enumerate() {
            let n = i + 1;
            for object in step.objects() {
                if !map.contains(object) {
                    return Err(fail(format!("step {n}: unknown object '{object}'")));
                }
            }
            match step {
                Step::Wait { seconds, until } => {
                    if !seconds.is_finite() || *seconds < 0.0 {
                        return Err(fail(format!("step {n}: invalid wait of {seconds}s")));
                    }
                    if *seconds > MAX_WAIT_SECONDS {
                        return Err(fail(format!(
                            "step {n}: wait of {seconds}s exceeds the {MAX_WAIT_SECONDS}s limit"
                        )));
                    }
                    if let Some(condition) = until {
                        match (&condition.property, &condition.equals) {
                            (Some(property), Some(_)) => check_property(&self.name, property)?,
                            (None, None) => {}
                            _ => {
                                return Err(fail(format!(
                                    "step {n}: 'property' and 'equals' must be given together"
                                )));
                            }
                        }
                    }
                }
                Step::AssertEquals { property, .. } => check_property(&self.name, property)?,
                Step::Click { .. } | Step::Drag { .. } => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
name: take_off
description: Take off
steps:
  - action: click
    object: gCS_buttonRect_Rectangle
    x: 146
    y: 60
    button: LeftButton
  - action: drag
    object: gCS_Text
    x: 6
    y: 8
    dx: 662
    dy: 36
    modifier: NoModifier
  - action: wait
    seconds: 6
    until:
      object: gCS_Flying_Text
  - action: assert_equals
    object: gCS_Flying_Text
    property: text
    expected: Flying
"#;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_steps() {
            let scenario = Scenario::from_yaml(SCENARIO).unwrap();
            assert_eq!(scenario.steps.len(), 4);
            assert_eq!(scenario.steps[0].event(), Some(MouseEvent::click(146, 60)));
            assert_eq!(scenario.steps[1].event(), Some(MouseEvent::drag(6, 8, 662, 36)));
            assert!(matches!(
                &scenario.steps[2],
                Step::Wait { seconds, until: Some(c) } if *seconds == 6.0 && c.object == "gCS_Flying_Text"
            ));
            assert!(matches!(
                &scenario.steps[3],
                Step::AssertEquals { expected: AttrValue::Str(s), .. } if s == "Flying"
            ));
        }

        #[test]
        fn test_boolean_expectation() {
            let yaml = "name: t\nsteps:\n  - action: assert_equals\n    object: a\n    property: visible\n    expected: true\n";
            let scenario = Scenario::from_yaml(yaml).unwrap();
            assert!(matches!(
                scenario.steps[0],
                Step::AssertEquals { expected: AttrValue::Bool(true), .. }
            ));
        }

        #[test]
        fn test_step_display() {
            let scenario = Scenario::from_yaml(SCENARIO).unwrap();
            let lines: Vec<String> = scenario.steps.iter().map(ToString::to_string).collect();
            assert_eq!(lines[0], "left click at (146, 60) on gCS_buttonRect_Rectangle");
            assert_eq!(lines[2], "wait up to 6s until gCS_Flying_Text exists");
            assert_eq!(lines[3], "assert gCS_Flying_Text.text == \"Flying\"");
        }

        #[test]
        fn test_snooze_is_a_wait() {
            let yaml = "name: t\nsteps:\n  - action: snooze\n    seconds: 2.5\n";
            let scenario = Scenario::from_yaml(yaml).unwrap();
            assert_eq!(
                scenario.steps[0],
                Step::Wait {
                    seconds: 2.5,
                    until: None
                }
            );
        }

        #[test]
        fn test_numeric_expectation() {
            let yaml = "name: t\nsteps:\n  - action: assert_equals\n    object: gCS_Text\n    property: text\n    expected: 42.3314\n";
            let scenario = Scenario::from_yaml(yaml).unwrap();
            let Step::AssertEquals { expected, .. } = &scenario.steps[0] else {
                panic!("expected an assert_equals step");
            };
            assert_eq!(expected, &AttrValue::Float(42.3314));
            assert!(expected.matches(&AttrValue::from("42.331400")));
        }

        #[test]
        fn test_unknown_action_rejected() {
            let yaml = "name: t\nsteps:\n  - action: type_text\n    object: a\n";
            assert!(matches!(Scenario::from_yaml(yaml), Err(GroundcheckError::Yaml(_))));
        }
    }

    mod validation_tests {
        use super::*;

        fn map() -> ObjectMap {
            ObjectMap::builtin().unwrap()
        }

        #[test]
        fn test_valid_against_builtin_map() {
            Scenario::from_yaml(SCENARIO).unwrap().validate(&map()).unwrap();
        }

        #[test]
        fn test_unknown_object() {
            let mut scenario = Scenario::from_yaml(SCENARIO).unwrap();
            scenario.steps.push(Step::AssertEquals {
                object: "gCS_Nope".to_string(),
                property: "text".to_string(),
                expected: AttrValue::from("x"),
            });
            let err = scenario.validate(&map()).unwrap_err();
            assert!(err.to_string().contains("step 5: unknown object 'gCS_Nope'"));
        }

        #[test]
        fn test_negative_wait() {
            let mut scenario = Scenario::from_yaml(SCENARIO).unwrap();
            scenario.steps[2] = Step::Wait {
                seconds: -1.0,
                until: None,
            };
            assert!(scenario.validate(&map()).is_err());
        }

        #[test]
        fn test_wait_upper_bound() {
            let mut scenario = Scenario::from_yaml(SCENARIO).unwrap();
            scenario.steps[2] = Step::Wait {
                seconds: 1e9,
                until: None,
            };
            let err = scenario.validate(&map()).unwrap_err();
            assert!(err.to_string().contains("exceeds the 3600s limit"));

            scenario.steps[2] = Step::Wait {
                seconds: MAX_WAIT_SECONDS,
                until: None,
            };
            scenario.validate(&map()).unwrap();
        }

        #[test]
        fn test_unnamed_is_readable() {
            let mut scenario = Scenario::from_yaml(SCENARIO).unwrap();
            scenario.steps[3] = Step::AssertEquals {
                object: "gCS_QQuickWindowQmlImpl".to_string(),
                property: "unnamed".to_string(),
                expected: AttrValue::from(1_i64),
            };
            scenario.validate(&map()).unwrap();
        }

        #[test]
        fn test_half_condition() {
            let mut scenario = Scenario::from_yaml(SCENARIO).unwrap();
            scenario.steps[2] = Step::Wait {
                seconds: 1.0,
                until: Some(Condition {
                    object: "gCS_Flying_Text".to_string(),
                    property: Some("text".to_string()),
                    equals: None,
                }),
            };
            let err = scenario.validate(&map()).unwrap_err();
            assert!(err.to_string().contains("must be given together"));
        }

        #[test]
        fn test_unreadable_property() {
            let mut scenario = Scenario::from_yaml(SCENARIO).unwrap();
            scenario.steps[3] = Step::AssertEquals {
                object: "gCS_Flying_Text".to_string(),
                property: "opacity".to_string(),
                expected: AttrValue::from("1"),
            };
            let err = scenario.validate(&map()).unwrap_err();
            assert!(err.to_string().contains("property 'opacity' cannot be read"));
        }

        #[test]
        fn test_empty_scenario() {
            let scenario = Scenario {
                name: "empty".to_string(),
                description: String::new(),
                steps: Vec::new(),
            };
            assert!(scenario.validate(&map()).is_err());
        }
    }
}
