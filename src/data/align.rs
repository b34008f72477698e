//! Equal-length dataset projection for multi-series charting.

use std::collections::HashMap;

use plcwatch_types::{Register, RegisterId};

use super::series::SeriesBuffer;

/// One chart-ready series for a monitored register.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    pub register_id: RegisterId,
    pub name: String,
    /// Values on the shared index axis. `None` means "no value yet" and must
    /// be rendered as a gap the line connects across, never as zero.
    pub points: Vec<Option<f64>>,
}

impl AlignedSeries {
    /// The points that exist, paired with their index position.
    ///
    /// This is the gap-spanning projection: absent points simply don't
    /// produce a coordinate, so a line drawn through the result connects
    /// across them.
    pub fn present_points(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|v| (i, v)))
    }
}

/// Project the buffers of all monitored registers onto one index axis.
///
/// Every returned series has the length of the longest buffer among the
/// monitored set ("reference length"); shorter series are left-padded with
/// `None` so that a register which started updating late lines up with
/// established ones. A monitored register with no buffer yet yields an
/// all-`None` series of the reference length.
pub fn align(
    registers: &[Register],
    buffers: &HashMap<RegisterId, SeriesBuffer>,
) -> Vec<AlignedSeries> {
    let monitored: Vec<&Register> = registers.iter().filter(|r| r.monitored).collect();

    let reference = monitored
        .iter()
        .map(|r| buffers.get(&r.id).map_or(0, SeriesBuffer::len))
        .max()
        .unwrap_or(0);

    monitored
        .iter()
        .map(|register| {
            let mut points = vec![None; reference];
            if let Some(buffer) = buffers.get(&register.id) {
                let pad = reference - buffer.len();
                for (i, (_, value)) in buffer.values().enumerate() {
                    points[pad + i] = Some(value);
                }
            }
            AlignedSeries {
                register_id: register.id,
                name: register.name.clone(),
                points,
            }
        })
        .collect()
}
