//! As-of alignment of finer timeframes onto a coarse bar series.

use tracing::warn;
use trading_core::types::{AlignedRow, FineSnapshot, IndicatorSet};

use crate::engine::IndicatorSeries;

/// Joins fine indicator series onto coarse bars.
///
/// For each coarse bar at time `T`, the attached fine snapshot is the one of
/// the latest fine bar with timestamp `<= T`. Fields still missing after the
/// join are filled from the previous coarse row's snapshot of the same
/// timeframe, which is always older. Rows before the first fine bar keep an
/// empty snapshot. Gaps in either series are tolerated.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeframeAligner;

impl TimeframeAligner {
    pub fn new() -> Self {
        Self
    }

    /// One [`AlignedRow`] per coarse bar.
    pub fn align(&self, coarse: &IndicatorSeries, fine: &[IndicatorSeries]) -> Vec<AlignedRow> {
        let mut rows: Vec<AlignedRow> = coarse
            .bars
            .iter()
            .zip(&coarse.indicators)
            .map(|(bar, set)| AlignedRow::new(*bar, coarse.timeframe, *set))
            .collect();

        for series in fine {
            if !series.timeframe.is_finer_than(coarse.timeframe) {
                warn!(
                    fine = %series.timeframe,
                    coarse = %coarse.timeframe,
                    "Aligning a timeframe that is not finer than the coarse one"
                );
            }
            for (row, snapshot) in rows.iter_mut().zip(Self::as_of(coarse, series)) {
                row.fine.push(snapshot);
            }
        }

        rows
    }

    fn as_of(coarse: &IndicatorSeries, series: &IndicatorSeries) -> Vec<FineSnapshot> {
        let mut snapshots = Vec::with_capacity(coarse.bars.len());
        let mut next = 0;
        let mut previous = IndicatorSet::default();

        for bar in &coarse.bars {
            while next < series.bars.len() && series.bars[next].timestamp <= bar.timestamp {
                next += 1;
            }

            let (as_of, mut indicators) = match next.checked_sub(1) {
                Some(idx) => (
                    Some(series.bars[idx].timestamp),
                    series.indicators.get(idx).copied().unwrap_or_default(),
                ),
                None => (None, IndicatorSet::default()),
            };
            indicators.forward_fill(&previous);
            previous = indicators;

            snapshots.push(FineSnapshot {
                timeframe: series.timeframe,
                as_of,
                indicators,
            });
        }

        snapshots
    }
}
