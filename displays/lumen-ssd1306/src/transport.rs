//! Bus transports
//!
//! The controller only ever sends two kinds of frame:
//!
//! | Frame   | Bytes                 |
//! |---------|-----------------------|
//! | Command | `[0x00, cmd]`         |
//! | Data    | `[0x40, payload...]`  |
//!
//! Data frames go out as a single bus transaction so a full framebuffer
//! never needs a second copy with the control byte prepended.

use embedded_hal::i2c::Operation;
use heapless::Vec;

/// Control byte preceding a command
pub const CONTROL_COMMAND: u8 = 0x00;

/// Control byte preceding display RAM data
pub const CONTROL_DATA: u8 = 0x40;

/// Factory-default SSD1306 address (0x3D with SA0 pulled high)
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Lowest non-reserved 7-bit address
pub const FIRST_ADDRESS: u8 = 0x08;

/// Highest non-reserved 7-bit address
pub const LAST_ADDRESS: u8 = 0x77;

/// Upper bound on devices found by a scan
pub const MAX_DEVICES: usize = (LAST_ADDRESS - FIRST_ADDRESS + 1) as usize;

/// Link between the controller and the panel
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Bus error
    type Error;

    /// Address of the panel this transport talks to
    fn address(&self) -> u8;

    /// Whether the panel acknowledges its address
    async fn probe(&mut self) -> Result<bool, Self::Error>;

    /// Send one command byte
    async fn send_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Send command bytes, one frame each
    async fn send_commands(&mut self, commands: &[u8]) -> Result<(), Self::Error> {
        for &c in commands {
            self.send_command(c).await?;
        }
        Ok(())
    }

    /// Write display RAM
    async fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// Probe every non-reserved address with an empty write
pub async fn scan<I2C>(i2c: &mut I2C) -> Vec<u8, MAX_DEVICES>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    let mut found = Vec::new();
    for addr in FIRST_ADDRESS..=LAST_ADDRESS {
        if i2c.write(addr, &[]).await.is_ok() {
            // Capacity covers the whole range
            let _ = found.push(addr);
        }
    }
    found
}

/// Blocking variant of [`scan`]
pub fn scan_blocking<I2C>(i2c: &mut I2C) -> Vec<u8, MAX_DEVICES>
where
    I2C: embedded_hal::i2c::I2c,
{
    let mut found = Vec::new();
    for addr in FIRST_ADDRESS..=LAST_ADDRESS {
        if i2c.write(addr, &[]).is_ok() {
            let _ = found.push(addr);
        }
    }
    found
}

/// Async I2C transport
pub struct I2cTransport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cTransport<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    /// Wrap a bus, talking to the panel at `address`
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// List responding addresses on the bus
    pub async fn scan(&mut self) -> Vec<u8, MAX_DEVICES> {
        scan(&mut self.i2c).await
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Transport for I2cTransport<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    type Error = I2C::Error;

    fn address(&self) -> u8 {
        self.address
    }

    async fn probe(&mut self) -> Result<bool, Self::Error> {
        Ok(self.scan().await.contains(&self.address))
    }

    async fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[CONTROL_COMMAND, command]).await
    }

    async fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.i2c
            .transaction(
                self.address,
                &mut [Operation::Write(&[CONTROL_DATA]), Operation::Write(data)],
            )
            .await
    }
}

/// Transport over a blocking I2C bus
///
/// For HALs without an async bus. Each call completes before its future
/// first polls ready.
pub struct BlockingI2cTransport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> BlockingI2cTransport<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Wrap a bus, talking to the panel at `address`
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// List responding addresses on the bus
    pub fn scan(&mut self) -> Vec<u8, MAX_DEVICES> {
        scan_blocking(&mut self.i2c)
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Transport for BlockingI2cTransport<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    type Error = I2C::Error;

    fn address(&self) -> u8 {
        self.address
    }

    async fn probe(&mut self) -> Result<bool, Self::Error> {
        Ok(self.scan().contains(&self.address))
    }

    async fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[CONTROL_COMMAND, command])
    }

    async fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.i2c.transaction(
            self.address,
            &mut [Operation::Write(&[CONTROL_DATA]), Operation::Write(data)],
        )
    }
}
