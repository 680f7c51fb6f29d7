use crate::annotations::box_record::BoxRecord;
use crate::annotations::detection_set::ImageDetectionSet;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// A set of custom errors for annotation lines that cannot be decoded.
///
/// A malformed line fails the whole file rather than being dropped, so a
/// detector writing garbage is caught instead of silently losing boxes.
/// Line numbers are 1-based, matching what an editor shows.
#[derive(Debug, PartialEq)]
pub enum ParseError {
    WrongTokenCount {
        line_number: usize,
        token_count: usize,
    },
    InvalidToken {
        line_number: usize,
        field: &'static str,
        token: String,
    },
    NonPositiveExtent {
        line_number: usize,
        width: f32,
        height: f32,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::WrongTokenCount { line_number, token_count } => {
                write!(
                    f,
                    "Failed to decode line {}, expected 5 or 6 fields but found {}.",
                    line_number, token_count
                )
            }
            ParseError::InvalidToken { line_number, field, token } => {
                write!(
                    f,
                    "Failed to decode line {}, {:?} is not a valid value for {}.",
                    line_number, token, field
                )
            }
            ParseError::NonPositiveExtent { line_number, width, height } => {
                write!(
                    f,
                    "Failed to decode line {}, box extent must be positive (width {}, height {}).",
                    line_number, width, height
                )
            }
        }
    }
}

impl Error for ParseError {}

/// Decodes the line-oriented annotation text format.
///
/// Each non-empty line must hold `class x_center y_center width height`
/// with an optional trailing confidence, whitespace separated. Blank lines
/// are skipped.
pub fn decode(text: &str) -> Result<ImageDetectionSet, ParseError> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < 5 || tokens.len() > 6 {
            return Err(ParseError::WrongTokenCount {
                line_number,
                token_count: tokens.len(),
            });
        }
        let class_index = parse_field::<u32>(tokens[0], "class_index", line_number)?;
        let x_center = parse_field::<f32>(tokens[1], "x_center", line_number)?;
        let y_center = parse_field::<f32>(tokens[2], "y_center", line_number)?;
        let width = parse_field::<f32>(tokens[3], "width", line_number)?;
        let height = parse_field::<f32>(tokens[4], "height", line_number)?;
        let confidence = match tokens.get(5) {
            Some(token) => Some(parse_field::<f32>(token, "confidence", line_number)?),
            None => None,
        };
        if width <= 0.0 || height <= 0.0 {
            return Err(ParseError::NonPositiveExtent { line_number, width, height });
        }
        records.push(BoxRecord {
            class_index,
            x_center,
            y_center,
            width,
            height,
            confidence,
        });
    }
    Ok(ImageDetectionSet::from_records(records))
}

fn parse_field<T: FromStr>(
    token: &str,
    field: &'static str,
    line_number: usize,
) -> Result<T, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidToken {
        line_number,
        field,
        token: token.to_string(),
    })
}

/// Serializes a detection set back into the annotation text format, one line
/// per record with a trailing newline. Records with no recorded confidence
/// are written with the caller-supplied default, so every emitted line has
/// all 6 fields.
pub fn encode(set: &ImageDetectionSet, default_confidence: f32) -> String {
    let mut text = String::new();
    for record in set.iter() {
        text.push_str(&format!(
            "{} {} {} {} {} {}\n",
            record.class_index,
            record.x_center,
            record.y_center,
            record.width,
            record.height,
            record.confidence.unwrap_or(default_confidence),
        ));
    }
    text
}
