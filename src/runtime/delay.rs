use crate::consts::SAMPLER_SETTLE_US;
use crate::error::LinkError;
use crate::node::Node;
use core::convert::Infallible;
use embedded_hal::delay::DelayNs;

/// Runs a blocking loop that drives every entry point of a node.
///
/// For environments where interrupts are unavailable or undesired. Each pass
/// ticks the node, services any event the tick raised, runs one foreground
/// pass and then waits `tick_us`. Before the first pass it waits for the
/// sampler to settle.
///
/// # Arguments
/// - `node`: The node to drive, usually the [`Link`](crate::node::Link) from `boot()`.
/// - `delay`: A delay provider implementing `DelayNs`, typically from the HAL.
/// - `tick_us`: The delay between passes, in microseconds (see `tick_interval_us`).
///
/// # Example
/// ```rust,ignore
/// let mut node = boot(&mut role_pin, make_master, make_slave)?;
/// run_link_loop(&mut node, &mut delay, 1)?;
/// ```
///
/// # Returns
/// - Only on an error from the node; it never returns otherwise.
pub fn run_link_loop<N, D>(
    node: &mut N,
    delay: &mut D,
    tick_us: u32,
) -> Result<Infallible, LinkError>
where
    N: Node,
    D: DelayNs,
{
    delay.delay_us(SAMPLER_SETTLE_US);
    loop {
        node.tick()?;
        if node.has_pending() {
            let _ = node.service()?;
        }
        node.poll()?;
        delay.delay_us(tick_us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplerConfig;
    use crate::node::MasterNode;
    use crate::testing::{InstantConverter, MemorySink, ScriptedEngine};
    use embedded_hal_mock::eh1::delay::NoopDelay;

    #[test]
    fn test_loop_runs_until_node_fails() {
        let mut engine = ScriptedEngine::default();
        engine.fail_after = Some(10);
        let mut node = MasterNode::new(
            engine,
            InstantConverter(0x2a00),
            SamplerConfig::default(),
            MemorySink::default(),
            MemorySink::default(),
        )
        .unwrap();
        let mut delay = NoopDelay::new();

        assert!(matches!(
            run_link_loop(&mut node, &mut delay, 1),
            Err(LinkError::Pin)
        ));
        assert_eq!(node.engine().ticks, 10);
        // one request per completed sample, first one on the first pass
        assert_eq!(node.counter(), 10);
        assert_eq!(node.sample_value(), 0x2a);
    }
}
