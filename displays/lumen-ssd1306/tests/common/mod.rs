//! Shared test fixtures: an in-memory I2C bus

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

/// Panel RAM: 128 columns by 8 pages
const RAM_LEN: usize = 128 * 8;

/// Display RAM with the controller's horizontal-mode write pointer
#[derive(Debug)]
pub struct Gddram {
    pub bytes: Vec<u8>,
    columns: (usize, usize),
    pages: (usize, usize),
    column: usize,
    page: usize,
    /// Command awaiting arguments: opcode, arguments so far, arguments needed
    pending: Option<(u8, Vec<u8>, usize)>,
}

impl Default for Gddram {
    fn default() -> Self {
        // Power-on reset window
        Self {
            bytes: vec![0; RAM_LEN],
            columns: (0, 127),
            pages: (0, 7),
            column: 0,
            page: 0,
            pending: None,
        }
    }
}

impl Gddram {
    fn command(&mut self, byte: u8) {
        if let Some((opcode, mut args, needed)) = self.pending.take() {
            args.push(byte);
            if args.len() < needed {
                self.pending = Some((opcode, args, needed));
                return;
            }
            match opcode {
                0x21 => {
                    self.columns = (args[0] as usize, args[1] as usize);
                    self.column = self.columns.0;
                }
                0x22 => {
                    self.pages = (args[0] as usize, args[1] as usize);
                    self.page = self.pages.0;
                }
                _ => {}
            }
            return;
        }
        let needed = match byte {
            0x21 | 0x22 => 2,
            0x26 | 0x27 => 6,
            0x20 | 0x81 | 0x8D | 0xA8 | 0xD3 | 0xD5 | 0xD9 | 0xDA | 0xDB => 1,
            _ => 0,
        };
        if needed > 0 {
            self.pending = Some((byte, Vec::new(), needed));
        }
    }

    fn write(&mut self, data: &[u8]) {
        for &b in data {
            self.bytes[self.page * 128 + self.column] = b;
            self.column += 1;
            if self.column > self.columns.1 {
                self.column = self.columns.0;
                self.page += 1;
                if self.page > self.pages.1 {
                    self.page = self.pages.0;
                }
            }
        }
    }
}

/// What the bus saw
#[derive(Debug, Default)]
pub struct BusLog {
    /// Address that acknowledges, if any
    pub present: Option<u8>,
    /// Non-empty write transactions, payloads concatenated
    pub frames: Vec<Vec<u8>>,
    /// Number of upcoming data frames to reject
    pub fail_data: usize,
    /// Next data frame stops with an error after this many bytes
    pub fail_data_after: Option<usize>,
    /// Panel memory as the controller would hold it
    pub ram: Gddram,
}

/// I2C bus implementing both the blocking and async traits
#[derive(Clone, Default)]
pub struct MockBus {
    pub log: Arc<Mutex<BusLog>>,
}

impl MockBus {
    /// Bus with a panel answering at `address`
    pub fn with_device(address: u8) -> Self {
        let bus = Self::default();
        bus.log.lock().unwrap().present = Some(address);
        bus
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.log.lock().unwrap().frames.clone()
    }

    /// Command bytes in send order
    pub fn commands(&self) -> Vec<u8> {
        self.frames()
            .iter()
            .filter(|f| f[0] == 0x00)
            .map(|f| f[1])
            .collect()
    }

    /// Data payloads without the control byte
    pub fn data_frames(&self) -> Vec<Vec<u8>> {
        self.frames()
            .iter()
            .filter(|f| f[0] == 0x40)
            .map(|f| f[1..].to_vec())
            .collect()
    }

    pub fn fail_next_data(&self, count: usize) {
        self.log.lock().unwrap().fail_data = count;
    }

    /// Let the next data frame write `count` bytes, then fail
    pub fn fail_data_after(&self, count: usize) {
        self.log.lock().unwrap().fail_data_after = Some(count);
    }

    /// Panel RAM contents
    pub fn ram(&self) -> Vec<u8> {
        self.log.lock().unwrap().ram.bytes.clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().frames.clear();
    }

    fn handle(&self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
        let mut log = self.log.lock().unwrap();
        if log.present != Some(address) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        let mut frame = Vec::new();
        for op in operations.iter() {
            if let Operation::Write(bytes) = op {
                frame.extend_from_slice(bytes);
            }
        }
        if frame.is_empty() {
            return Ok(());
        }
        if frame[0] == 0x40 {
            if log.fail_data > 0 {
                log.fail_data -= 1;
                return Err(ErrorKind::Other);
            }
            if let Some(count) = log.fail_data_after.take() {
                let end = (count + 1).min(frame.len());
                log.ram.write(&frame[1..end]);
                return Err(ErrorKind::Other);
            }
            log.ram.write(&frame[1..]);
        } else {
            for &b in &frame[1..] {
                log.ram.command(b);
            }
        }
        log.frames.push(frame);
        Ok(())
    }
}

impl ErrorType for MockBus {
    type Error = ErrorKind;
}

impl embedded_hal::i2c::I2c for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.handle(address, operations)
    }
}

impl embedded_hal_async::i2c::I2c for MockBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.handle(address, operations)
    }
}

/// 7x12 font covering "H" and "i", in the on-disk JSON form
pub const FONT_JSON: &str = r#"{
    "width": 7,
    "hight": 12,
    "chars": {
        "H": [0, 65, 65, 65, 65, 127, 65, 65, 65, 65, 0, 0],
        "i": [0, 8, 0, 12, 8, 8, 8, 8, 8, 28, 0, 0]
    }
}"#;
