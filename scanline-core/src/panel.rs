//! ST7789 panel bring-up
//!
//! The panel is configured once at startup over a chip-select gated SPI
//! link, then left in RAM-write data mode. From then on every full frame
//! the flip engine streams lands at the top-left again, so no further
//! commands are needed as long as whole frames are always sent.

use scanline_hal::{Clock, OutputPin, SpiBus};

/// ST7789 command opcodes
#[allow(dead_code)]
pub mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPOUT: u8 = 0x11;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const GAMSET: u8 = 0x26;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const TEON: u8 = 0x35;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;
    pub const STE: u8 = 0x44;
    pub const FRMCTR1: u8 = 0xB1;
    pub const FRMCTR2: u8 = 0xB2;
    pub const GCTRL: u8 = 0xB7;
    pub const DGMEN: u8 = 0xBA;
    pub const VCOMS: u8 = 0xBB;
    pub const LCMCTRL: u8 = 0xC0;
    pub const VDVVRHEN: u8 = 0xC2;
    pub const VRHS: u8 = 0xC3;
    pub const VDVS: u8 = 0xC4;
    pub const FRCTRL2: u8 = 0xC6;
    pub const PWRCTRL1: u8 = 0xD0;
    pub const GMCTRP1: u8 = 0xE0;
    pub const GMCTRN1: u8 = 0xE1;
}

/// Panel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// The SPI link reported an error
    Communication,
}

/// One step of the bring-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelCommand {
    pub opcode: u8,
    pub payload: &'static [u8],
    /// Settle time after the command
    pub delay_ms: u32,
}

impl PanelCommand {
    const fn new(opcode: u8, payload: &'static [u8]) -> Self {
        Self {
            opcode,
            payload,
            delay_ms: 0,
        }
    }

    const fn then_wait(self, delay_ms: u32) -> Self {
        Self { delay_ms, ..self }
    }
}

/// PicoSystem bring-up: 12-bit color, tearing-effect output on, full
/// 240x240 window, ending in RAM write
pub const INIT_SEQUENCE: &[PanelCommand] = &[
    PanelCommand::new(cmd::SWRESET, &[]).then_wait(5),
    PanelCommand::new(cmd::MADCTL, &[0x04]),
    PanelCommand::new(cmd::TEON, &[0x00]),
    PanelCommand::new(cmd::FRMCTR2, &[0x0C, 0x0C, 0x00, 0x33, 0x33]),
    PanelCommand::new(cmd::COLMOD, &[0x03]),
    PanelCommand::new(cmd::GAMSET, &[0x01]),
    PanelCommand::new(cmd::GCTRL, &[0x14]),
    PanelCommand::new(cmd::VCOMS, &[0x25]),
    PanelCommand::new(cmd::LCMCTRL, &[0x2C]),
    PanelCommand::new(cmd::VDVVRHEN, &[0x01]),
    PanelCommand::new(cmd::VRHS, &[0x12]),
    PanelCommand::new(cmd::VDVS, &[0x20]),
    PanelCommand::new(cmd::PWRCTRL1, &[0xA4, 0xA1]),
    PanelCommand::new(cmd::FRCTRL2, &[0x1E]),
    PanelCommand::new(
        cmd::GMCTRP1,
        &[
            0xD0, 0x04, 0x0D, 0x11, 0x13, 0x2B, 0x3F, 0x54, 0x4C, 0x18, 0x0D, 0x0B, 0x1F, 0x23,
        ],
    ),
    PanelCommand::new(
        cmd::GMCTRN1,
        &[
            0xD0, 0x04, 0x0C, 0x11, 0x13, 0x2C, 0x3F, 0x44, 0x51, 0x2F, 0x1F, 0x1F, 0x20, 0x23,
        ],
    ),
    PanelCommand::new(cmd::INVON, &[]).then_wait(115),
    PanelCommand::new(cmd::SLPOUT, &[]),
    PanelCommand::new(cmd::DISPON, &[]),
    PanelCommand::new(cmd::CASET, &[0x00, 0x00, 0x00, 0xEF]),
    PanelCommand::new(cmd::RASET, &[0x00, 0x00, 0x00, 0xEF]),
    PanelCommand::new(cmd::RAMWR, &[]),
];

/// Something that accepts panel commands
pub trait CommandBus {
    /// Send an opcode followed by its (possibly empty) parameter bytes
    fn send_command(&mut self, opcode: u8, payload: &[u8]) -> Result<(), PanelError>;
}

/// Command channel over SPI with chip-select and data/command lines
pub struct SpiCommandBus<S, CS, DC> {
    spi: S,
    cs: CS,
    dc: DC,
}

impl<S: SpiBus, CS: OutputPin, DC: OutputPin> SpiCommandBus<S, CS, DC> {
    /// Take the link and deselect the panel
    pub fn new(spi: S, mut cs: CS, dc: DC) -> Self {
        cs.set_high();
        Self { spi, cs, dc }
    }

    /// Select the panel in data mode and hand the pins back
    ///
    /// Called once bring-up is finished; the pixel transport then takes
    /// over the clock and data lines while CS and DC stay put.
    pub fn enter_data_mode(mut self) -> (S, CS, DC) {
        self.cs.set_low();
        self.dc.set_high();
        (self.spi, self.cs, self.dc)
    }
}

impl<S: SpiBus, CS: OutputPin, DC: OutputPin> CommandBus for SpiCommandBus<S, CS, DC> {
    fn send_command(&mut self, opcode: u8, payload: &[u8]) -> Result<(), PanelError> {
        self.cs.set_low();
        self.dc.set_low();
        let result = self.spi.write(&[opcode]).and_then(|()| {
            if payload.is_empty() {
                return Ok(());
            }
            self.dc.set_high();
            self.spi.write(payload)
        });
        self.cs.set_high();
        result.map_err(|_| PanelError::Communication)
    }
}

/// How long the reset line is held low
pub const RESET_PULSE_MS: u32 = 100;

/// Hardware-reset the panel through its active-low reset line
pub fn reset_panel<P: OutputPin, C: Clock>(reset: &mut P, clock: &mut C) {
    reset.set_low();
    clock.sleep_ms(RESET_PULSE_MS);
    reset.set_high();
}

/// Run [`INIT_SEQUENCE`] on the panel
pub fn init_panel<B: CommandBus, C: Clock>(bus: &mut B, clock: &mut C) -> Result<(), PanelError> {
    run_sequence(bus, clock, INIT_SEQUENCE)
}

/// Run a command table, honoring each step's settle time
pub fn run_sequence<B: CommandBus, C: Clock>(
    bus: &mut B,
    clock: &mut C,
    sequence: &[PanelCommand],
) -> Result<(), PanelError> {
    for step in sequence {
        bus.send_command(step.opcode, step.payload)?;
        if step.delay_ms > 0 {
            clock.sleep_ms(step.delay_ms);
        }
    }
    Ok(())
}
