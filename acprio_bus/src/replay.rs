//! Replays a recorded PV/SOC trace through the controller.
//!
//! Each `refresh` moves to the next row. The settings live in memory, so the
//! setpoints the controller writes can be inspected after the run.

use acprio_config::TraceRow;
use acprio_traits::{BusItem, DataBus};

use crate::error::BusError;

#[derive(Debug, Clone)]
pub struct ReplayBus {
    rows: Vec<TraceRow>,
    cursor: Option<usize>,
    setting_w: f64,
    minimum_soc: f64,
    history: Vec<f64>,
}

impl ReplayBus {
    pub fn new(rows: Vec<TraceRow>, minimum_soc: f64, initial_setting_w: f64) -> Self {
        Self {
            rows,
            cursor: None,
            setting_w: initial_setting_w,
            minimum_soc,
            history: Vec::new(),
        }
    }

    /// Rows not yet consumed by `refresh`.
    pub fn remaining(&self) -> usize {
        match self.cursor {
            None => self.rows.len(),
            Some(i) => self.rows.len().saturating_sub(i + 1),
        }
    }

    /// Every value written to the discharge setting, in order.
    pub fn written(&self) -> &[f64] {
        &self.history
    }

    pub fn setting_w(&self) -> f64 {
        self.setting_w
    }

    fn current(&self) -> Result<&TraceRow, BusError> {
        self.cursor
            .and_then(|i| self.rows.get(i))
            .ok_or(BusError::TraceExhausted(self.rows.len()))
    }
}

impl DataBus for ReplayBus {
    fn refresh(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let next = self.cursor.map_or(0, |i| i + 1);
        if next >= self.rows.len() {
            return Err(Box::new(BusError::TraceExhausted(self.rows.len())));
        }
        self.cursor = Some(next);
        Ok(())
    }

    fn read(&mut self, item: BusItem) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match item {
            BusItem::MaxDischargePower => self.setting_w,
            BusItem::MinimumSocLimit => self.minimum_soc,
            BusItem::PvPower => self.current()?.pv_power_w,
            BusItem::BatterySoc => self.current()?.soc,
        })
    }

    fn write(
        &mut self,
        item: BusItem,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !item.is_writable() {
            return Err(Box::new(BusError::ReadOnly(item)));
        }
        self.setting_w = value;
        self.history.push(value);
        Ok(())
    }
}
