#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// State 0 black, live states from red to yellow.
pub fn default_ramp(states: u16) -> Box<[Rgb]> {
    let live = states.saturating_sub(1);
    (0..states)
        .map(|state| {
            if state == 0 {
                return Rgb::default();
            }
            let green = if live <= 1 {
                0
            } else {
                (u32::from(state - 1) * 255 / u32::from(live - 1)) as u8
            };
            Rgb::new(255, green, 0)
        })
        .collect()
}
