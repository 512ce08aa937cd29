//! Block-character rendering of a [`SpectrumFrame`].

use davood_core::visual::spectrum::SpectrumFrame;

/// Partial cells, empty to full, in eighths.
const LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Draw `frame` as `rows` lines of bars, top row first. One column per band.
pub fn render_frame(frame: &SpectrumFrame, rows: usize) -> Vec<String> {
    let heights = frame.bar_heights(rows as f64);
    (0..rows)
        .map(|row| {
            let floor = (rows - 1 - row) as f64;
            heights
                .iter()
                .map(|h| {
                    let fill = (h - floor).clamp(0.0, 1.0);
                    LEVELS[(fill * 8.0).round() as usize]
                })
                .collect()
        })
        .collect()
}
