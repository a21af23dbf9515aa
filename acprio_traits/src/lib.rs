//! Seams between the discharge controller and its environment.
//!
//! The controller never talks to a transport directly: everything it reads or
//! writes goes through [`DataBus`], addressed by [`BusItem`].
pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

use std::fmt;

/// The four values the controller exchanges with its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusItem {
    /// ESS max discharge power setting (W). Read each tick, and the only writable item.
    MaxDischargePower,
    /// BatteryLife minimum SOC limit (%).
    MinimumSocLimit,
    /// DC-coupled PV power (W).
    PvPower,
    /// Battery state of charge (%).
    BatterySoc,
}

impl BusItem {
    pub const ALL: [BusItem; 4] = [
        BusItem::MaxDischargePower,
        BusItem::MinimumSocLimit,
        BusItem::PvPower,
        BusItem::BatterySoc,
    ];

    /// Owning service on a Venus-OS style bus.
    pub fn service(self) -> &'static str {
        match self {
            BusItem::MaxDischargePower | BusItem::MinimumSocLimit => "com.victronenergy.settings",
            BusItem::PvPower | BusItem::BatterySoc => "com.victronenergy.system",
        }
    }

    /// Object path within [`BusItem::service`].
    pub fn path(self) -> &'static str {
        match self {
            BusItem::MaxDischargePower => "/Settings/CGwacs/MaxDischargePower",
            BusItem::MinimumSocLimit => "/Settings/CGwacs/BatteryLife/MinimumSocLimit",
            BusItem::PvPower => "/Dc/Pv/Power",
            BusItem::BatterySoc => "/Dc/Battery/Soc",
        }
    }

    pub fn is_writable(self) -> bool {
        matches!(self, BusItem::MaxDischargePower)
    }
}

impl fmt::Display for BusItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.service(), self.path())
    }
}

/// Synchronous access to the host's settings and measurements.
///
/// Implementations must complete each call before returning; the controller
/// never issues overlapping calls.
pub trait DataBus {
    /// Called once at the start of every tick, before the four reads. Transports
    /// that can snapshot their values latch them here so one tick sees one
    /// consistent view.
    fn refresh(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    fn read(&mut self, item: BusItem) -> Result<f64, Box<dyn std::error::Error + Send + Sync>>;
    fn write(
        &mut self,
        item: BusItem,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<B: DataBus + ?Sized> DataBus for Box<B> {
    fn refresh(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).refresh()
    }

    fn read(&mut self, item: BusItem) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read(item)
    }

    fn write(
        &mut self,
        item: BusItem,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).write(item, value)
    }
}

#[cfg(test)]
mod tests {
    use super::BusItem;

    #[test]
    fn only_discharge_setting_is_writable() {
        let writable: Vec<_> = BusItem::ALL.iter().filter(|i| i.is_writable()).collect();
        assert_eq!(writable, vec![&BusItem::MaxDischargePower]);
    }

    #[test]
    fn display_joins_service_and_path() {
        assert_eq!(
            BusItem::BatterySoc.to_string(),
            "com.victronenergy.system/Dc/Battery/Soc"
        );
    }
}
