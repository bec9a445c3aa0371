use serde::Serialize;

/// Hours between sticky axis bar labels.
pub const AXIS_BAR_STRIDE_HOURS: u32 = 2;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LabelAlign {
    Left,
    Center,
    Right,
}

impl LabelAlign {
    pub fn as_css(self) -> &'static str {
        match self {
            LabelAlign::Left => "left",
            LabelAlign::Center => "center",
            LabelAlign::Right => "right",
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct AxisBarLabel {
    pub text: String,
    pub align: LabelAlign,
}

/// `0:00` to `24:00` every two hours; the outer labels hug the bar edges.
pub fn axis_bar_labels() -> Vec<AxisBarLabel> {
    let hours: Vec<u32> = (0..=24).step_by(AXIS_BAR_STRIDE_HOURS as usize).collect();
    let last = hours.len() - 1;
    hours
        .into_iter()
        .enumerate()
        .map(|(i, hour)| AxisBarLabel {
            text: format!("{hour}:00"),
            align: if i == 0 {
                LabelAlign::Left
            } else if i == last {
                LabelAlign::Right
            } else {
                LabelAlign::Center
            },
        })
        .collect()
}
