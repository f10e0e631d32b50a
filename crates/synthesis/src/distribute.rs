/// Splits `total_seconds` over legs in proportion to their distances.
///
/// Every leg but the last receives its rounded share, the last leg receives
/// what remains so the result sums to `total_seconds`. Without any distance to
/// weigh by, the duration is split evenly and the integer remainder goes to the
/// earliest legs. No leg receives less than zero.
pub fn distribute(leg_distances: &[f64], total_seconds: i64) -> Vec<i64> {
    if leg_distances.is_empty() {
        return vec![];
    }
    let total_seconds = total_seconds.max(0);
    let total_distance: f64 = leg_distances.iter().map(|d| d.max(0.0)).sum();

    if total_distance <= 0.0 || total_seconds == 0 {
        let count = leg_distances.len() as i64;
        let share = total_seconds / count;
        let remainder = total_seconds % count;
        return (0..count)
            .map(|index| share + i64::from(index < remainder))
            .collect();
    }

    let last = leg_distances.len() - 1;
    let mut assigned = 0;
    let mut durations = leg_distances[..last]
        .iter()
        .map(|distance| {
            let share = (total_seconds as f64 * distance.max(0.0) / total_distance).round() as i64;
            assigned += share;
            share
        })
        .collect::<Vec<_>>();
    durations.push((total_seconds - assigned).max(0));
    durations
}
