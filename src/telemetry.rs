//! Strict decoding of captured analyzer output into telemetry.
//!
//! Two payload shapes exist. Most suites print a single JSON object; the
//! expectation-invariant analyzer prints its inferred invariant on the
//! first line and the JSON object on the second. Anything else (crash
//! before emission, negative numbers, missing fields) is a decode failure,
//! which the invocation adapter records as an error outcome.

use crate::schema::Telemetry;
use crate::suite::PayloadShape;
use std::io;

/// A decoded payload: telemetry plus the optional leading result label.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub telemetry: Telemetry,
    pub result_label: Option<String>,
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn decode_line(line: &str) -> io::Result<Telemetry> {
    let telemetry: Telemetry = serde_json::from_str(line.trim())
        .map_err(|e| invalid(format!("telemetry payload: {e}")))?;
    if !telemetry.solve_time.is_finite() || telemetry.solve_time < 0.0 {
        return Err(invalid(format!(
            "telemetry payload: solve_time {} out of range",
            telemetry.solve_time
        )));
    }
    Ok(telemetry)
}

/// Decode captured stdout bytes according to the suite's payload shape.
pub fn decode(bytes: &[u8], shape: PayloadShape) -> io::Result<Payload> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| invalid("telemetry payload: not valid UTF-8"))?;
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    match shape {
        PayloadShape::Telemetry => {
            let line = lines.next().ok_or_else(|| invalid("empty analyzer output"))?;
            Ok(Payload {
                telemetry: decode_line(line)?,
                result_label: None,
            })
        }
        PayloadShape::LabeledTelemetry => {
            let label = lines
                .next()
                .ok_or_else(|| invalid("empty analyzer output"))?
                .trim()
                .to_string();
            let line = lines
                .next()
                .ok_or_else(|| invalid("missing telemetry line after result label"))?;
            Ok(Payload {
                telemetry: decode_line(line)?,
                result_label: Some(label),
            })
        }
    }
}
