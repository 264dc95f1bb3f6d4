//! Sensirion SGP30 gas sensor driver.
//!
//! Talks to the sensor over any `embedded_hal::i2c::I2c` bus and implements
//! [`IaqSensorPort`] for the scheduler.  Every command is a 16-bit opcode;
//! data travels as 16-bit big-endian words, each followed by a CRC-8.
//!
//! ## Timing
//!
//! The sensor does not clock-stretch.  After each command the driver waits
//! the datasheet's maximum execution time before reading the reply.

use crc::{CRC_8_NRSC_5, Crc};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::{DriverError, IaqSensorPort};
use crate::baseline::CalibrationBaseline;

use super::{AbsoluteHumidity, MeasurementSample};

/// Fixed 7-bit bus address.
pub const SGP30_ADDR: u8 = 0x58;

/// Sensirion word checksum: poly 0x31, init 0xFF, no reflection.
const WORD_CRC: Crc<u8> = Crc::<u8>::new(&CRC_8_NRSC_5);

type Cmd = [u8; 2];

const IAQ_INIT: Cmd = [0x20, 0x03];
const MEASURE_IAQ: Cmd = [0x20, 0x08];
const GET_IAQ_BASELINE: Cmd = [0x20, 0x15];
const SET_IAQ_BASELINE: Cmd = [0x20, 0x1e];
const SET_ABSOLUTE_HUMIDITY: Cmd = [0x20, 0x61];
const MEASURE_TEST: Cmd = [0x20, 0x32];
const GET_SERIAL_ID: Cmd = [0x36, 0x82];

// Max execution times (ms).
const IAQ_INIT_MS: u32 = 10;
const MEASURE_IAQ_MS: u32 = 12;
const BASELINE_MS: u32 = 10;
const HUMIDITY_MS: u32 = 10;
const MEASURE_TEST_MS: u32 = 220;
const SERIAL_ID_MS: u32 = 1;

/// Pattern returned by a passing on-chip self-test.
const SELF_TEST_OK: u16 = 0xD400;

/// Longest reply is three words (serial ID), three bytes each.
const MAX_REPLY: usize = 9;

/// CRC-8 over one big-endian data word.
pub fn word_crc(word: [u8; 2]) -> u8 {
    WORD_CRC.checksum(&word)
}

/// SGP30 driver owning its bus handle and delay provider.
pub struct Sgp30<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D> Sgp30<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            address: SGP30_ADDR,
        }
    }

    /// Give the bus and delay back (e.g. to share the bus afterwards).
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// 48-bit unique serial number.
    pub fn serial_number(&mut self) -> Result<u64, DriverError> {
        let mut words = [0u16; 3];
        self.read_words(GET_SERIAL_ID, SERIAL_ID_MS, &mut words)?;
        Ok(words
            .iter()
            .fold(0u64, |acc, &w| (acc << 16) | u64::from(w)))
    }

    /// Run the on-chip self-test.  Must not be called while the IAQ
    /// algorithm is running, since it resets the algorithm state.
    pub fn measure_test(&mut self) -> Result<(), DriverError> {
        let mut words = [0u16; 1];
        self.read_words(MEASURE_TEST, MEASURE_TEST_MS, &mut words)?;
        if words[0] == SELF_TEST_OK {
            Ok(())
        } else {
            warn!("SGP30: self-test returned 0x{:04X}", words[0]);
            Err(DriverError::SelfTestFailed)
        }
    }

    // ── Framing ───────────────────────────────────────────────

    fn command(&mut self, cmd: Cmd, exec_ms: u32) -> Result<(), DriverError> {
        self.i2c
            .write(self.address, &cmd)
            .map_err(|_| DriverError::Bus)?;
        self.delay.delay_ms(exec_ms);
        Ok(())
    }

    fn command_with_args(
        &mut self,
        cmd: Cmd,
        args: &[u16],
        exec_ms: u32,
    ) -> Result<(), DriverError> {
        // Two opcode bytes plus up to two argument words.
        let mut frame = [0u8; 8];
        frame[..2].copy_from_slice(&cmd);
        let mut len = 2;
        for &arg in args {
            let bytes = arg.to_be_bytes();
            frame[len..len + 2].copy_from_slice(&bytes);
            frame[len + 2] = word_crc(bytes);
            len += 3;
        }
        self.i2c
            .write(self.address, &frame[..len])
            .map_err(|_| DriverError::Bus)?;
        self.delay.delay_ms(exec_ms);
        Ok(())
    }

    fn read_words(&mut self, cmd: Cmd, exec_ms: u32, out: &mut [u16]) -> Result<(), DriverError> {
        self.command(cmd, exec_ms)?;

        let mut buf = [0u8; MAX_REPLY];
        let reply = &mut buf[..out.len() * 3];
        self.i2c
            .read(self.address, reply)
            .map_err(|_| DriverError::Bus)?;

        for (word, chunk) in out.iter_mut().zip(reply.chunks_exact(3)) {
            let bytes = [chunk[0], chunk[1]];
            if word_crc(bytes) != chunk[2] {
                warn!(
                    "SGP30: CRC mismatch on word 0x{:02X}{:02X} (got 0x{:02X})",
                    chunk[0], chunk[1], chunk[2]
                );
                return Err(DriverError::Crc);
            }
            *word = u16::from_be_bytes(bytes);
        }
        Ok(())
    }
}

impl<I2C, D> IaqSensorPort for Sgp30<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn init(&mut self) -> Result<(), DriverError> {
        self.command(IAQ_INIT, IAQ_INIT_MS)
    }

    fn measure_iaq(&mut self) -> Result<MeasurementSample, DriverError> {
        let mut words = [0u16; 2];
        self.read_words(MEASURE_IAQ, MEASURE_IAQ_MS, &mut words)?;
        Ok(MeasurementSample {
            co2eq_ppm: words[0],
            tvoc_ppb: words[1],
        })
    }

    fn set_iaq_baseline(&mut self, baseline: CalibrationBaseline) -> Result<(), DriverError> {
        // The sensor expects TVOC first, the reverse of the read order.
        self.command_with_args(
            SET_IAQ_BASELINE,
            &[baseline.tvoc, baseline.co2eq],
            BASELINE_MS,
        )
    }

    fn get_iaq_baseline(&mut self) -> Result<CalibrationBaseline, DriverError> {
        let mut words = [0u16; 2];
        self.read_words(GET_IAQ_BASELINE, BASELINE_MS, &mut words)?;
        Ok(CalibrationBaseline::new(words[0], words[1]))
    }

    fn set_absolute_humidity(&mut self, code: AbsoluteHumidity) -> Result<(), DriverError> {
        self.command_with_args(SET_ABSOLUTE_HUMIDITY, &[code.code()], HUMIDITY_MS)
    }
}
