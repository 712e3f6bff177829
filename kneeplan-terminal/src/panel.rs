/// Colored readout of a plan snapshot
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
    QueueableCommand,
};
use kneeplan_core::{
    DisplayOptions, Frame, PlanParameters, PlanSnapshot, PlaneKind, ResectionRequest,
};
use nalgebra::Point3;
use std::io::Write;

/// One line of the readout.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: String,
    pub value: String,
    pub color: Color,
}

impl Row {
    fn new(label: impl Into<String>, value: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            color,
        }
    }
}

fn point(p: Point3<f64>) -> String {
    format!("({:8.3}, {:8.3}, {:8.3})", p.x, p.y, p.z)
}

fn plane_row(kind: PlaneKind, frame: Option<Frame>, display: &DisplayOptions) -> Row {
    let shown = if display.planes.is_visible(kind) {
        "shown"
    } else {
        "hidden"
    };
    match frame {
        Some(frame) => {
            let n = frame.normal();
            Row::new(
                kind.name(),
                format!(
                    "{} n=({:6.3}, {:6.3}, {:6.3}) [{shown}]",
                    point(frame.anchor()),
                    n.x,
                    n.y,
                    n.z
                ),
                Color::Green,
            )
        }
        None => Row::new(kind.name(), format!("absent [{shown}]"), Color::DarkGrey),
    }
}

/// Build the readout rows for `snapshot`.
pub fn rows(
    snapshot: &PlanSnapshot,
    parameters: &PlanParameters,
    display: &DisplayOptions,
    settled: Option<&ResectionRequest>,
) -> Vec<Row> {
    let mut rows = vec![
        Row::new(
            "varus/valgus",
            format!("{:+.1} deg", parameters.varus_valgus_angle.to_degrees()),
            Color::Cyan,
        ),
        Row::new(
            "extension",
            format!("{:+.1} deg", parameters.extension_angle.to_degrees()),
            Color::Cyan,
        ),
        Row::new(
            "resection depth",
            format!("{:.1}", parameters.resection_depth),
            Color::Cyan,
        ),
        Row::new(
            "anterior length",
            format!("{:.1}", parameters.anterior_line_length),
            Color::Cyan,
        ),
        Row::new(
            "lateral length",
            format!("{:.1}", parameters.lateral_line_length),
            Color::Cyan,
        ),
    ];

    rows.extend(
        PlaneKind::ALL
            .iter()
            .map(|&kind| plane_row(kind, snapshot.frame(kind), display)),
    );

    rows.push(match &snapshot.cutting_solid {
        Some(solid) => {
            let d = solid.extrusion_direction();
            Row::new(
                "cutting solid",
                format!(
                    "{:.2} x {:.2} x {:.2} toward ({:6.3}, {:6.3}, {:6.3})",
                    solid.size(),
                    solid.size(),
                    solid.depth(),
                    d.x,
                    d.y,
                    d.z
                ),
                Color::Green,
            )
        }
        None => Row::new("cutting solid", "absent", Color::DarkGrey),
    });

    let resection = if !display.resection {
        Row::new("resection", "off", Color::DarkGrey)
    } else {
        match settled {
            Some(request) if request.revision == snapshot.revision => Row::new(
                "resection",
                format!("settled at revision {}", request.revision),
                Color::Green,
            ),
            Some(request) => Row::new(
                "resection",
                format!("revision {} superseded", request.revision),
                Color::Yellow,
            ),
            None if snapshot.cutting_solid.is_some() => {
                Row::new("resection", "settling", Color::Yellow)
            }
            None => Row::new("resection", "waiting for cutting solid", Color::DarkGrey),
        }
    };
    rows.push(resection);
    rows
}

/// Writes rows below a fixed header.
pub struct StagePanel {
    label_width: usize,
}

impl StagePanel {
    pub fn new() -> Self {
        Self { label_width: 18 }
    }

    pub fn draw<W: Write>(&self, writer: &mut W, header: &str, rows: &[Row]) -> std::io::Result<()> {
        writer.queue(cursor::MoveTo(0, 0))?;
        writer.queue(Clear(ClearType::All))?;
        writer.queue(SetForegroundColor(Color::Yellow))?;
        writer.queue(Print(header))?;

        for (i, row) in rows.iter().enumerate() {
            writer.queue(cursor::MoveTo(0, i as u16 + 2))?;
            writer.queue(SetForegroundColor(Color::White))?;
            writer.queue(Print(format!("{:<width$}", row.label, width = self.label_width)))?;
            writer.queue(SetForegroundColor(row.color))?;
            writer.queue(Print(&row.value))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Default for StagePanel {
    fn default() -> Self {
        Self::new()
    }
}
