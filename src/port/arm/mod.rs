//! Cortex-M port
//!
//! SysTick drives the cooperative clock. Its handler does nothing but
//! increment the tick counter; no coroutine state is touched from
//! interrupt context.

use cortex_m::peripheral::syst::SystClkSource;

/// Initialize SysTick timer for clock tick generation
///
/// # Arguments
/// * `cnts` - Core clock cycles per tick
///
/// # Example
/// For 16MHz clock with 1000Hz tick rate: cnts = 16_000_000 / 1000 = 16_000
pub fn systick_init(cnts: u32) {
    let mut p = unsafe { cortex_m::Peripherals::steal() };

    p.SYST.set_reload(cnts - 1);
    p.SYST.clear_current();
    p.SYST.set_clock_source(SystClkSource::Core);
    p.SYST.enable_interrupt();
    p.SYST.enable_counter();
}

/// Sleep until the next interrupt, typically the next tick
#[inline(always)]
pub fn wait_for_interrupt() {
    cortex_m::asm::wfi();
}

#[cfg(feature = "systick")]
#[cortex_m_rt::exception]
fn SysTick() {
    crate::base::time::Clock::increment();
}

// ============ Language items ============

// With defmt, log over RTT and panic through panic-probe
#[cfg(feature = "defmt")]
use defmt_rtt as _;

#[cfg(feature = "defmt")]
use panic_probe as _;

#[cfg(feature = "defmt")]
#[defmt::panic_handler]
fn defmt_panic() -> ! {
    cortex_m::asm::udf()
}

#[cfg(not(feature = "defmt"))]
#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop { cortex_m::asm::udf(); }
}

#[cortex_m_rt::exception]
unsafe fn HardFault(_ef: &cortex_m_rt::ExceptionFrame) -> ! {
    loop { cortex_m::asm::udf(); }
}

// Log lines are stamped with the cooperative tick clock
#[cfg(feature = "defmt")]
defmt::timestamp!("{=u32}", crate::base::time::Clock::now());
