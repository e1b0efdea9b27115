use crate::domain::model::{LookupResult, Row, Units};
use crate::domain::ports::DistanceLookup;
use std::time::Duration;

/// Row Processor: one provider query per row, strictly sequential, in input order.
///
/// After every query the loop sleeps for `pause`, whatever the outcome. A
/// failed row never stops the rows after it.
pub struct RowProcessor<'a, L: DistanceLookup + ?Sized> {
    lookup: &'a L,
    units: Units,
    pause: Duration,
}

impl<'a, L: DistanceLookup + ?Sized> RowProcessor<'a, L> {
    pub fn new(lookup: &'a L, units: Units, pause: Duration) -> Self {
        Self {
            lookup,
            units,
            pause,
        }
    }

    pub async fn process(&self, rows: &[Row]) -> Vec<LookupResult> {
        self.process_with_progress(rows, |_, _| {}).await
    }

    /// Same as [`process`](Self::process), calling `on_progress(done, total)` after each row.
    pub async fn process_with_progress<F>(&self, rows: &[Row], mut on_progress: F) -> Vec<LookupResult>
    where
        F: FnMut(usize, usize) + Send,
    {
        let total = rows.len();
        let mut results = Vec::with_capacity(total);

        for (i, row) in rows.iter().enumerate() {
            let result = self.lookup_row(row).await;

            if result.is_ok() {
                tracing::debug!("[{}/{}] {} -> {}: OK", i + 1, total, row.origin(), row.destination());
            } else {
                tracing::warn!(
                    "[{}/{}] {} -> {}: {}",
                    i + 1,
                    total,
                    row.origin(),
                    row.destination(),
                    result.status()
                );
            }
            results.push(result);

            if !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            on_progress(i + 1, total);
        }

        results
    }

    async fn lookup_row(&self, row: &Row) -> LookupResult {
        let origin = row.origin();
        let destination = row.destination();

        // 空白地址不送出請求
        if origin.trim().is_empty() {
            return LookupResult::error("origin is empty");
        }
        if destination.trim().is_empty() {
            return LookupResult::error("destination is empty");
        }

        self.lookup.lookup(origin, destination, self.units).await
    }
}
