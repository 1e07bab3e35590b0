use std::fmt;

use crate::{
    error::{CamposeError, CamposeResult},
    vector::Vec3,
};


/// Parsing states.
enum Parse {
    None,
    From,
    To,
    Axis,
    Angle,
    Steps,
}


/// User defined settings for the path demo.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Position of the first keyframe.
    pub from: Vec3,
    /// Position of the second keyframe.
    pub to: Vec3,
    /// Axis the second keyframe is rotated about, relative to the first.
    pub axis: Vec3,
    /// Rotation of the second keyframe, in degrees.
    pub angle: f64,
    /// Number of poses sampled along the path, endpoints included.
    pub steps: usize,
}
impl Config {
    /// Create a new Config from command line arguments, program name
    /// excluded.
    pub fn new(args: Vec<String>) -> CamposeResult<Config> {
        let mut parser = Parse::None;
        let mut cfg    = Config::default();
        let mut flag   = String::new();
        let mut values = Vec::with_capacity(3);

        for arg in args.into_iter() {
            let next = match arg.as_str() {
                "-from"  => Some(Parse::From),
                "-to"    => Some(Parse::To),
                "-axis"  => Some(Parse::Axis),
                "-angle" => Some(Parse::Angle),
                "-steps" => Some(Parse::Steps),
                _ => None,
            };
            if let Some(next) = next {
                if !matches!(parser, Parse::None) {
                    return Err(CamposeError::MissingValue(flag));
                }
                parser = next;
                flag = arg;
                continue;
            }
            match parser {
                Parse::From | Parse::To | Parse::Axis => {
                    values.push(parse_number(&flag, &arg)?);
                    if values.len() == 3 {
                        let vec = Vec3::new(values[0], values[1], values[2]);
                        match parser {
                            Parse::From => cfg.from = vec,
                            Parse::To   => cfg.to = vec,
                            _           => cfg.axis = vec,
                        }
                        values.clear();
                        parser = Parse::None;
                    }
                }
                Parse::Angle => {
                    cfg.angle = parse_number(&flag, &arg)?;
                    parser = Parse::None;
                }
                Parse::Steps => {
                    match arg.parse::<usize>() {
                        Ok(steps) if steps >= 2 => cfg.steps = steps,
                        _ => return Err(CamposeError::InvalidSteps(arg)),
                    }
                    parser = Parse::None;
                }
                Parse::None => {
                    return Err(CamposeError::UnknownFlag(arg));
                }
            }
        }
        if !matches!(parser, Parse::None) {
            return Err(CamposeError::MissingValue(flag));
        }
        Ok(cfg)
    }
}

fn parse_number(flag: &str, arg: &str) -> CamposeResult<f64> {
    match arg.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CamposeError::InvalidNumber(flag.to_string(), arg.to_string())),
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "
            \rCamera Path
            \r=============================================================
            \rFrom:  {}
            \rTo:    {}
            \rAxis:  {}
            \rAngle: {} degrees
            \rSteps: {}",
            self.from,
            self.to,
            self.axis,
            self.angle,
            self.steps,
        )
    }
}
impl Default for Config {
    fn default() -> Self {
        Self {
            from: Vec3::zero(),
            to: Vec3::new(0.0, 0.0, 10.0),
            axis: Vec3::unit_y(),
            angle: 90.0,
            steps: 5,
        }
    }
}


#[cfg(test)]
fn args(line: &str) -> Vec<String> {
    line.split_whitespace().map(String::from).collect()
}

#[test]
fn parse_defaults() {
    assert_eq!(Config::new(Vec::new()), Ok(Config::default()));
}

#[test]
fn parse_all_flags() {
    let cfg = Config::new(args("-from 1 2 3 -to -4 5.5 -6 -axis 0 0 1 -angle -45 -steps 9")).unwrap();
    assert_eq!(cfg.from, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(cfg.to, Vec3::new(-4.0, 5.5, -6.0));
    assert_eq!(cfg.axis, Vec3::unit_z());
    assert_eq!(cfg.angle, -45.0);
    assert_eq!(cfg.steps, 9);
}

#[test]
fn parse_errors() {
    assert_eq!(
        Config::new(args("-from 1 2 -to 0 0 0")),
        Err(CamposeError::MissingValue("-from".into())),
    );
    assert_eq!(
        Config::new(args("-axis 0 1")),
        Err(CamposeError::MissingValue("-axis".into())),
    );
    assert_eq!(
        Config::new(args("-angle ninety")),
        Err(CamposeError::InvalidNumber("-angle".into(), "ninety".into())),
    );
    assert_eq!(
        Config::new(args("-steps 1")),
        Err(CamposeError::InvalidSteps("1".into())),
    );
    assert_eq!(
        Config::new(args("-speed 3")),
        Err(CamposeError::UnknownFlag("-speed".into())),
    );
}
