//! Test and helper mocks for acprio_core

use acprio_traits::{BusItem, DataBus};

/// A bus where every call fails; useful to exercise the fatal paths.
pub struct FailingBus;

impl DataBus for FailingBus {
    fn read(&mut self, item: BusItem) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other(format!("no reply for {item}"))))
    }

    fn write(
        &mut self,
        item: BusItem,
        _value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other(format!("no reply for {item}"))))
    }
}

/// Plain in-memory bus. Values are set directly by the test between ticks;
/// every accepted write is recorded and also updates `setting_w`.
#[derive(Debug, Clone, Default)]
pub struct MemoryBus {
    pub setting_w: f64,
    pub minimum_soc: f64,
    pub pv_power_w: f64,
    pub soc: f64,
    pub writes: Vec<f64>,
    /// When set, writes fail with this message.
    pub reject_writes: Option<String>,
}

impl MemoryBus {
    pub fn new(setting_w: f64, minimum_soc: f64, pv_power_w: f64, soc: f64) -> Self {
        Self {
            setting_w,
            minimum_soc,
            pv_power_w,
            soc,
            ..Self::default()
        }
    }
}

impl DataBus for MemoryBus {
    fn read(&mut self, item: BusItem) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match item {
            BusItem::MaxDischargePower => self.setting_w,
            BusItem::MinimumSocLimit => self.minimum_soc,
            BusItem::PvPower => self.pv_power_w,
            BusItem::BatterySoc => self.soc,
        })
    }

    fn write(
        &mut self,
        _item: BusItem,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(msg) = &self.reject_writes {
            return Err(msg.clone().into());
        }
        self.setting_w = value;
        self.writes.push(value);
        Ok(())
    }
}
