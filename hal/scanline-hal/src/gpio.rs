//! Digital lines
//!
//! Single output and input lines, plus [`InputPort`] for sampling the
//! button bank in one go.

/// Push-pull output line
pub trait OutputPin {
    fn set_high(&mut self);

    fn set_low(&mut self);

    /// Level the line is currently driven to
    fn is_set_high(&self) -> bool;

    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Input line
pub trait InputPin {
    fn is_high(&self) -> bool;

    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// A whole GPIO bank read in one access
///
/// Bit `n` of the returned mask is the level of GPIO `n`. Reading the bank
/// at once keeps every line in a sample coherent with the others.
pub trait InputPort {
    /// Read the raw level of every line in the bank
    fn read_inputs(&mut self) -> u32;
}

impl<T: InputPort + ?Sized> InputPort for &mut T {
    fn read_inputs(&mut self) -> u32 {
        (**self).read_inputs()
    }
}
