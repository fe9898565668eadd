//! Fan-in sweep command.

use std::ops::RangeInclusive;

use anyhow::{Result, ensure};
use comfy_table::{Cell, Color};
use gatebuf_core::regime::PartitionType;

use super::plan::PlanOutput;

/// Most rows a single sweep prints.
const MAX_SWEEP_POINTS: usize = 10_000;
use crate::output::{self, Format};
use crate::{BufferArgs, OutputFormat};

/// Run the sweep command.
pub fn run(
    partition: &str,
    channels: RangeInclusive<usize>,
    step: usize,
    buffers: &BufferArgs,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    ensure!(step > 0, "step must be positive");
    ensure!(!channels.is_empty(), "empty channel range {channels:?}");
    let points = sweep_point_count(&channels, step);
    ensure!(
        points <= MAX_SWEEP_POINTS,
        "sweep would print {points} rows, at most {MAX_SWEEP_POINTS} allowed; raise --step"
    );

    let config = super::load_config(buffers)?;
    let partition_type: PartitionType = partition.parse()?;

    let rows = sweep_points(&channels, step)
        .map(|count| -> Result<PlanOutput> {
            let (ceiling, plan) = config.plan_gate(partition_type, count)?;
            Ok(PlanOutput::new(partition_type, ceiling, &plan))
        })
        .collect::<Result<Vec<_>>>()?;

    match Format::from(format) {
        Format::Json => output::print_json(&rows, quiet)?,
        Format::Table => {
            if quiet {
                return Ok(());
            }
            let mut table = output::create_table();
            output::add_header(
                &mut table,
                &["Channels", "Exclusive", "Required Floating", "Total Floating", "Target"],
            );
            for row in &rows {
                let exclusive = Cell::new(row.exclusive_per_channel);
                table.add_row(vec![
                    Cell::new(row.channels),
                    if row.capped { exclusive.fg(Color::Yellow) } else { exclusive },
                    Cell::new(row.required_floating),
                    Cell::new(row.total_floating),
                    Cell::new(row.target_total),
                ]);
            }
            println!("{table}");
            if let Some(first) = rows.iter().find(|row| row.capped) {
                output::status(
                    &format!(
                        "Exclusive buffers capped from {} channels (ceiling {})",
                        first.channels, first.ceiling
                    ),
                    quiet,
                );
            }
        }
    }

    Ok(())
}

/// Channel counts visited by a sweep. The range end is always included.
fn sweep_points(
    channels: &RangeInclusive<usize>,
    step: usize,
) -> impl Iterator<Item = usize> + use<> {
    let (start, end) = (*channels.start(), *channels.end());
    let tail = ((end - start) % step != 0).then_some(end);
    channels.clone().step_by(step).chain(tail)
}

/// Number of points [`sweep_points`] yields, without visiting them.
fn sweep_point_count(channels: &RangeInclusive<usize>, step: usize) -> usize {
    let span = channels.end() - channels.start();
    (span / step)
        .saturating_add(1)
        .saturating_add(usize::from(span % step != 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_points() {
        let points = |range: RangeInclusive<usize>, step| -> Vec<usize> {
            sweep_points(&range, step).collect()
        };
        assert_eq!(points(1..=300, 100), vec![1, 101, 201, 300]);
        assert_eq!(points(100..=300, 100), vec![100, 200, 300]);
        assert_eq!(points(5..=5, 10), vec![5]);
    }

    #[test]
    fn test_sweep_point_count_matches_points() {
        for (range, step) in [(1..=300, 100), (100..=300, 100), (5..=5, 10), (1..=10, 3)] {
            let range: RangeInclusive<usize> = range;
            assert_eq!(
                sweep_point_count(&range, step),
                sweep_points(&range, step).count()
            );
        }
    }

    #[test]
    fn test_huge_sweep_is_lazy_and_rejected() {
        let range = 1..=usize::MAX;
        assert_eq!(sweep_points(&range, 1).take(3).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(sweep_point_count(&range, 1) > MAX_SWEEP_POINTS);
        assert_eq!(sweep_point_count(&(0..=usize::MAX), 1), usize::MAX);

        let err = run(
            "blocking",
            range,
            1,
            &BufferArgs::default(),
            OutputFormat::Json,
            true,
        )
        .unwrap_err();
        assert!(err.to_string().contains("raise --step"));
    }
}
