use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::foundation::{color::Rgb8, core::Point};

/// A user-placed point marker in base-image pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    /// Marker center.
    pub pos: Point,
    /// Fill override, `None` for the default fill.
    pub color: Option<Rgb8>,
}

impl Marker {
    /// Marker at `(x, y)` with the default fill.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            pos: Point::new(x, y),
            color: None,
        }
    }

    /// Same marker with an explicit fill.
    pub fn with_color(mut self, color: Rgb8) -> Self {
        self.color = Some(color);
        self
    }
}

/// A point as echoed back to callers: coordinates only.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    /// X in pixels.
    pub x: f64,
    /// Y in pixels.
    pub y: f64,
}

/// Ordered marker input.
///
/// Every entry of the input array occupies a slot, so serial numbers stay tied to the input
/// position even when some entries are malformed (`None`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarkerList {
    slots: Vec<Option<Marker>>,
}

impl MarkerList {
    /// Parse a JSON array of `{x, y, color?}` objects.
    ///
    /// Anything that is not a JSON array yields an empty list. Entries without usable `x`/`y`
    /// keep their slot but are never drawn nor echoed.
    pub fn parse(json: &str) -> Self {
        let value: Value = match serde_json::from_str(json) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed points JSON");
                return Self::default();
            }
        };
        let Value::Array(items) = value else {
            tracing::warn!("points JSON is not an array, ignoring");
            return Self::default();
        };

        let slots = items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let marker = parse_marker(item);
                if marker.is_none() {
                    tracing::debug!(index = idx, "skipping malformed point entry");
                }
                marker
            })
            .collect();
        Self { slots }
    }

    /// Build a list where every slot is a valid marker.
    pub fn from_markers(markers: impl IntoIterator<Item = Marker>) -> Self {
        Self {
            slots: markers.into_iter().map(Some).collect(),
        }
    }

    /// Number of input slots, malformed ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Return `true` when the input array was empty (or unusable).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Valid markers with their 1-based serial numbers.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &Marker)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|m| (idx + 1, m)))
    }

    /// Valid markers as bare coordinates, in input order.
    pub fn normalized(&self) -> Vec<NormalizedPoint> {
        self.numbered()
            .map(|(_, m)| NormalizedPoint {
                x: m.pos.x,
                y: m.pos.y,
            })
            .collect()
    }

    /// Compact JSON array of [`NormalizedPoint`]s.
    pub fn normalized_json(&self) -> String {
        let points = self.normalized();
        serde_json::to_string(&points).unwrap_or_else(|e| {
            // Only reachable with non-finite coordinates, which parsing never produces.
            tracing::warn!(error = %e, "failed to serialize points");
            "[]".to_string()
        })
    }
}

fn parse_marker(item: &Value) -> Option<Marker> {
    let obj = item.as_object()?;
    let x = coerce_coord(obj.get("x")?)?;
    let y = coerce_coord(obj.get("y")?)?;

    let color = match obj.get("color").and_then(Value::as_str) {
        Some(hex) => match Rgb8::parse_hex(hex) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::debug!(color = hex, error = %e, "unusable marker color, using default");
                None
            }
        },
        None => None,
    };

    Some(Marker {
        pos: Point::new(x, y),
        color,
    })
}

fn coerce_coord(v: &Value) -> Option<f64> {
    let f = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

#[cfg(test)]
#[path = "../../tests/unit/annotate/points.rs"]
mod tests;
