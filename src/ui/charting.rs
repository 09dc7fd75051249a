use mathdrill::scoring::ReviewItem;

const MAX_BAR_WIDTH: u16 = 7;

/// Bar labels and heights for the seconds-per-question chart
pub fn time_bars(items: &[ReviewItem]) -> Vec<(String, u64)> {
    items
        .iter()
        .map(|item| (format!("Q{}", item.number), item.time_spent_secs))
        .collect()
}

/// Widest bar that lets `count` bars and their gaps fit in `available` columns
pub fn bar_width(available: u16, count: usize) -> u16 {
    if count == 0 {
        return MAX_BAR_WIDTH;
    }
    let per_bar = available as usize / count;
    (per_bar.saturating_sub(1) as u16).clamp(1, MAX_BAR_WIDTH)
}
