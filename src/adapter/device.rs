//! Bring-up, teardown and polling of one bridge chip, shared by the single
//! and multi bridge adapters.
use crate::adapter::traits::bridge::{BridgeDevice, BridgeHost, DeviceSettings};
use crate::config::{GpioPin, InstanceConfig};
use crate::error::{CanError, HalError, InitCause};
use crate::frame::Frame;
use crate::irq::RxNotifier;

/// Attach, probe, configure and arm one chip on an already registered bus.
///
/// On failure the chip is detached again before returning, so the caller only
/// has to undo the bus registration. Once the interrupt line is armed, a mark
/// is posted on `notifier` so the first `receive` reads the chip's status.
pub(crate) fn bring_up<H: BridgeHost>(
    host: &mut H,
    bus: &mut H::Bus,
    config: &InstanceConfig,
    index: usize,
    notifier: Option<&RxNotifier>,
) -> Result<H::Device, CanError> {
    let settings = DeviceSettings::from(config);
    let mut device = host
        .attach_device(bus, &settings)
        .map_err(|err| CanError::InitFailure {
            index,
            cause: InitCause::DeviceAttach(err),
        })?;

    if let Err(cause) = prepare(&mut device, config, index, notifier) {
        host.detach_device(bus, device);
        return Err(CanError::InitFailure { index, cause });
    }

    #[cfg(feature = "defmt")]
    defmt::debug!(
        "Instance {} up on host {} (cs {})",
        index,
        config.host.0,
        config.device.cs.0
    );
    Ok(device)
}

fn prepare<D: BridgeDevice>(
    device: &mut D,
    config: &InstanceConfig,
    index: usize,
    notifier: Option<&RxNotifier>,
) -> Result<(), InitCause> {
    device.probe().map_err(|err| match err {
        HalError::NotDetected => InitCause::DeviceNotDetected,
        other => InitCause::Probe(other),
    })?;
    device
        .configure(config.bitrate, config.oscillator, config.mode)
        .map_err(InitCause::Configure)?;
    if let Some(pin) = config.device.int {
        device
            .arm_interrupt(pin, index)
            .map_err(InitCause::Interrupt)?;
        // A frame latched before arming holds the line low without a new edge.
        if let Some(notifier) = notifier {
            notifier.notify(index);
        }
    }
    Ok(())
}

/// Disarm the interrupt (if any) and detach the chip from its bus.
pub(crate) fn tear_down<H: BridgeHost>(
    host: &mut H,
    bus: &mut H::Bus,
    mut device: H::Device,
    interrupt: Option<GpioPin>,
) {
    if let Some(pin) = interrupt {
        device.disarm_interrupt(pin);
    }
    host.detach_device(bus, device);
}

/// Transmit after frame validation.
pub(crate) fn transmit<D: BridgeDevice>(device: &mut D, frame: &Frame) -> Result<(), CanError> {
    if !frame.validate() {
        return Err(CanError::InvalidFrame);
    }
    device.transmit(frame)?;

    #[cfg(feature = "defmt")]
    defmt::trace!("TX id={=u32:#x} len={}", frame.id, frame.len);
    Ok(())
}

/// Non-blocking read of one frame from `device`.
///
/// When the chip has an armed interrupt line and a notifier is attached, the
/// bus is only read if the notifier holds a mark for `index`. After a
/// successful read the mark is re-posted: the chip may hold a second frame and
/// its interrupt line will not produce a new edge for it.
pub(crate) fn poll<D: BridgeDevice>(
    device: &mut D,
    gate: Option<&RxNotifier>,
    index: usize,
    out: &mut Frame,
) -> Result<bool, CanError> {
    if let Some(notifier) = gate {
        if !notifier.take(index) {
            return Ok(false);
        }
    }

    match device.read_pending() {
        Ok(Some(frame)) => {
            *out = frame;
            if let Some(notifier) = gate {
                notifier.notify(index);
            }
            #[cfg(feature = "defmt")]
            defmt::trace!("RX[{}] id={=u32:#x} len={}", index, frame.id, frame.len);
            Ok(true)
        }
        Ok(None) => Ok(false),
        Err(err) => {
            // Keep the mark so the frame is retried on the next call.
            if let Some(notifier) = gate {
                notifier.notify(index);
            }
            Err(err.into())
        }
    }
}
