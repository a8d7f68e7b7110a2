//! Line-oriented scene file parser
//!
//! Each non-empty line is either a `key value...` record setting a workspace
//! parameter or a command `<timestamp> <x> <y> <z>`. Everything after `#` is a
//! comment.
//!
//! ```text
//! # 20 x 10 m field, anchors 8 m up
//! dim 20 10 8
//! start 10 5 0
//! vmax 2
//! amax 1
//! freq 10
//!
//! 5  10 5 4     # lift
//! 12 15 5 4
//! ```

use super::{Command, Scene};
use crate::config::ConfigError;
use crate::motion::Point3;

/// Strip the comment part of a line.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_number(token: &str, line: usize) -> Result<f64, ConfigError> {
    token.parse::<f64>().map_err(|_| ConfigError::Parse {
        line,
        message: format!("'{}' is not a number", token),
    })
}

fn parse_numbers<const N: usize>(
    key: &str,
    values: &[&str],
    line: usize,
) -> Result<[f64; N], ConfigError> {
    if values.len() != N {
        return Err(ConfigError::Parse {
            line,
            message: format!("'{}' expects {} value(s), found {}", key, N, values.len()),
        });
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(values) {
        *slot = parse_number(token, line)?;
    }
    Ok(out)
}

/// Parse the full text of a scene file.
pub fn parse_scene(src: &str) -> Result<Scene, ConfigError> {
    let mut scene = Scene::default();

    for (idx, raw) in src.lines().enumerate() {
        let line = idx + 1;
        let tokens: Vec<&str> = strip_comment(raw).split_whitespace().collect();
        let Some((&key, values)) = tokens.split_first() else {
            continue;
        };

        match key {
            "dim" => scene.config.dim = Point3::from_array(parse_numbers::<3>(key, values, line)?),
            "start" => scene.config.start = Point3::from_array(parse_numbers::<3>(key, values, line)?),
            "vmax" => scene.config.vmax = Some(parse_numbers::<1>(key, values, line)?[0]),
            "amax" => scene.config.amax = Some(parse_numbers::<1>(key, values, line)?[0]),
            "freq" => scene.config.freq = Some(parse_numbers::<1>(key, values, line)?[0]),
            _ if key.starts_with(|c: char| c.is_ascii_digit()) => {
                let [timestamp, x, y, z] = parse_numbers::<4>("command", &tokens, line)?;
                if let Some(prev) = scene.commands.last() {
                    if timestamp <= prev.timestamp {
                        tracing::warn!(
                            "Line {}: command timestamp {}s does not follow {}s",
                            line,
                            timestamp,
                            prev.timestamp
                        );
                    }
                }
                scene.commands.push(Command::new(timestamp, Point3::new(x, y, z)));
            }
            _ => {
                tracing::warn!("Line {}: ignoring unknown record '{}'", line, key);
            }
        }
    }

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = "\
# spidercam test scene
dim 20 10 8
start 10 5 0   # centre of the field
vmax 2
amax 1
freq 10

5 10 5 4
12.5 15 5 4
";

    #[test]
    fn test_parse_full_scene() {
        let scene = parse_scene(SCENE).unwrap();
        assert_eq!(scene.config.dim, Point3::new(20.0, 10.0, 8.0));
        assert_eq!(scene.config.start, Point3::new(10.0, 5.0, 0.0));
        assert_eq!(scene.config.vmax, Some(2.0));
        assert_eq!(scene.config.amax, Some(1.0));
        assert_eq!(scene.config.freq, Some(10.0));
        assert_eq!(
            scene.commands,
            vec![
                Command::new(5.0, Point3::new(10.0, 5.0, 4.0)),
                Command::new(12.5, Point3::new(15.0, 5.0, 4.0)),
            ]
        );
    }

    #[test]
    fn test_missing_limits_stay_unset() {
        let scene = parse_scene("dim 1 1 1\n1 0 0 0\n").unwrap();
        assert_eq!(scene.config.vmax, None);
        assert_eq!(scene.config.amax, None);
        assert_eq!(scene.config.freq, None);
    }

    #[test]
    fn test_comment_only_and_unknown_lines_are_skipped() {
        let scene = parse_scene("# nothing\n   \nlabel take-one\n").unwrap();
        assert!(scene.commands.is_empty());
    }

    #[test]
    fn test_bad_arity_reports_line() {
        let err = parse_scene("dim 1 2 3\nstart 1 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));

        let err = parse_scene("\n\n3 1 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_non_numeric_value_reports_line() {
        let err = parse_scene("vmax fast\n").unwrap_err();
        match err {
            ConfigError::Parse { line, message } => {
                assert_eq!(line, 1);
                assert!(message.contains("fast"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
