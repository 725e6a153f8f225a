use embedded_hal::blocking::i2c::{Write, WriteRead};
use std::fmt::Debug;

/// Register-level access to the rangefinder.
///
/// The poller owns one of these for the lifetime of the driver. Implement it
/// directly to put the driver on something other than an embedded-hal bus,
/// or to script the device in tests.
pub trait RegisterBus: Send + 'static {
    type Error: Debug;

    /// Write a single byte to `register`.
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error>;

    /// Fill `buf` starting at `register`. The byte count is `buf.len()`.
    fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error>;
}

/// A [`RegisterBus`] over any blocking embedded-hal I2C implementation,
/// talking to one device at a 7-bit `address`.
pub struct I2cRegisters<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cRegisters<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        I2cRegisters { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the underlying bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> RegisterBus for I2cRegisters<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E> + Send + 'static,
    E: Debug,
{
    type Error = E;

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), E> {
        self.i2c.write(self.address, &[register, value])
    }

    fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), E> {
        self.i2c.write_read(self.address, &[register], buf)
    }
}
