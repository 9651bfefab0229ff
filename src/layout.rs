//! Column width allocation for the picker table.

/// Extra width the key column gets before any other column grows.
pub const PREFERRED_KEY_EXTRA_WIDTH: u16 = 15;
/// Upper bound for the key column's extra width.
pub const MAX_KEY_EXTRA_WIDTH: u16 = 30;

/// How a column takes part in distributing spare width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grow {
    /// Receives spare width first (the key path column).
    Preferred,
    /// Receives whatever the preferred column does not take (the name column).
    Overflow,
    Fixed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub title: &'static str,
    pub base: u16,
    pub grow: Grow,
}

impl Column {
    const fn new(title: &'static str, base: u16, grow: Grow) -> Self {
        Self { title, base, grow }
    }
}

pub const CONFIG_COLUMNS: [Column; 5] = [
    Column::new("Name", 15, Grow::Overflow),
    Column::new("Host", 20, Grow::Fixed),
    Column::new("Port", 5, Grow::Fixed),
    Column::new("User", 10, Grow::Fixed),
    Column::new("Key", 10, Grow::Preferred),
];

pub const HISTORY_COLUMNS: [Column; 6] = [
    Column::new("Name", 10, Grow::Overflow),
    Column::new("Host", 20, Grow::Fixed),
    Column::new("Port", 5, Grow::Fixed),
    Column::new("User", 10, Grow::Fixed),
    Column::new("Key", 0, Grow::Preferred),
    Column::new("Last login", 15, Grow::Fixed),
];

/// Resolves render widths for `columns` given `available` cells.
///
/// When there is room, fixed columns keep their base width and the spare
/// cells go to the preferred column (up to [`PREFERRED_KEY_EXTRA_WIDTH`]),
/// then to preferred and overflow in pairs (until the preferred column
/// reaches [`MAX_KEY_EXTRA_WIDTH`]), and finally to the overflow column.
/// Otherwise every column is scaled down proportionally, never below 1.
pub fn layout(available: u16, columns: &[Column]) -> Vec<u16> {
    let total_base: u32 = columns.iter().map(|c| u32::from(c.base)).sum();

    if u32::from(available) >= total_base {
        grow(available - total_base as u16, columns)
    } else {
        shrink(available, total_base, columns)
    }
}

fn grow(mut leftover: u16, columns: &[Column]) -> Vec<u16> {
    let mut extra_preferred: u16 = 0;
    let mut extra_overflow: u16 = 0;

    while leftover > 0 {
        if extra_preferred < PREFERRED_KEY_EXTRA_WIDTH {
            extra_preferred += 1;
            leftover -= 1;
        } else if extra_preferred < MAX_KEY_EXTRA_WIDTH && leftover > 1 {
            extra_preferred += 1;
            extra_overflow += 1;
            leftover -= 2;
        } else {
            extra_overflow += 1;
            leftover -= 1;
        }
    }

    columns
        .iter()
        .map(|c| match c.grow {
            Grow::Preferred => c.base + extra_preferred,
            Grow::Overflow => c.base + extra_overflow,
            Grow::Fixed => c.base,
        })
        .collect()
}

fn shrink(available: u16, total_base: u32, columns: &[Column]) -> Vec<u16> {
    let ratio = f64::from(available) / f64::from(total_base);
    columns
        .iter()
        .map(|c| ((f64::from(c.base) * ratio).round() as u16).max(1))
        .collect()
}
