use chrono::NaiveDate;

use crate::option::OptionHandle;

/// One leg of a spread: the current selection plus the option built for it.
///
/// `changed` stays set from the first differing selection until the
/// validator rebuilds the spread, so a change seen on a cycle whose
/// selection later failed is not lost.
#[derive(Debug, Clone, Default)]
pub struct LegState {
    strike: f64,
    expiry: Option<NaiveDate>,
    symbol: String,
    changed: bool,
    option: Option<OptionHandle>,
}

impl LegState {
    /// Overwrite the selection. Returns whether it differs from the previous one.
    pub fn update(&mut self, strike: f64, expiry: NaiveDate, symbol: &str) -> bool {
        let mut differs = false;

        if strike != self.strike {
            self.strike = strike;
            differs = true;
        }
        if Some(expiry) != self.expiry {
            self.expiry = Some(expiry);
            differs = true;
        }
        if symbol != self.symbol {
            symbol.clone_into(&mut self.symbol);
            differs = true;
        }

        self.changed |= differs;
        differs
    }

    /// Forget the selection and the built option.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Force a rebuild on the next cycle even if the selection stays put.
    pub(crate) fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub(crate) fn reset_changed(&mut self) {
        self.changed = false;
    }

    pub(crate) fn set_option(&mut self, option: Option<OptionHandle>) {
        self.option = option;
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn expiry(&self) -> Option<NaiveDate> {
        self.expiry
    }

    /// Provider symbol of the selected contract.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    /// `None` until the factory has delivered the option.
    pub fn option(&self) -> Option<&OptionHandle> {
        self.option.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 19).unwrap()
    }

    #[test]
    fn first_update_is_a_change() {
        let mut leg = LegState::default();
        assert!(leg.update(100.0, e1(), "XYZ C100"));
        assert!(leg.changed());
        assert_eq!(leg.strike(), 100.0);
        assert_eq!(leg.expiry(), Some(e1()));
        assert_eq!(leg.symbol(), "XYZ C100");
    }

    #[test]
    fn identical_update_after_build_is_unchanged() {
        let mut leg = LegState::default();
        leg.update(100.0, e1(), "XYZ C100");
        leg.reset_changed();

        assert!(!leg.update(100.0, e1(), "XYZ C100"));
        assert!(!leg.changed());
    }

    #[test]
    fn change_sticks_until_reset() {
        let mut leg = LegState::default();
        leg.update(100.0, e1(), "XYZ C100");
        leg.reset_changed();

        assert!(leg.update(105.0, e1(), "XYZ C105"));
        assert!(!leg.update(105.0, e1(), "XYZ C105"));
        assert!(leg.changed());
    }

    #[test]
    fn any_field_difference_is_a_change() {
        let mut leg = LegState::default();
        leg.update(100.0, e1(), "XYZ C100");

        assert!(leg.update(105.0, e1(), "XYZ C100"));
        assert!(leg.update(105.0, e1().succ_opt().unwrap(), "XYZ C100"));
        assert!(leg.update(105.0, e1().succ_opt().unwrap(), "XYZ C105"));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut leg = LegState::default();
        leg.update(100.0, e1(), "XYZ C100");
        leg.clear();

        assert!(!leg.changed());
        assert_eq!(leg.symbol(), "");
        assert!(leg.expiry().is_none());
        assert!(leg.option().is_none());
        // same selection again counts as new
        assert!(leg.update(100.0, e1(), "XYZ C100"));
    }
}
