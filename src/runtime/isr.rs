use crate::error::LinkError;
use crate::node::Node;
use core::cell::RefCell;
use critical_section::Mutex;

/// A node shared between `main()` and interrupt handlers.
pub type GlobalNode<N> = Mutex<RefCell<Option<N>>>;

/// Used to initialize the global static node for use with `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
///
/// # Example
/// ```rust,ignore
/// static LINK: GlobalNode<MyNode> = global_node_init::<MyNode>();
/// ```
pub const fn global_node_init<N: Node>() -> GlobalNode<N> {
    Mutex::new(RefCell::new(None))
}

/// Stores `node` in the global slot, replacing any earlier one.
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     let node = boot(&mut role_pin, make_master, make_slave)?;
///     global_node_setup(&LINK, node);
/// }
/// ```
pub fn global_node_setup<N: Node>(global: &'static GlobalNode<N>, node: N) {
    critical_section::with(|cs| {
        let _ = global.borrow(cs).replace(Some(node));
    });
}

/// Runs the node's tick at each timer interrupt. Does nothing before setup.
///
///# Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     global_node_tick(&LINK).ok();
/// }
/// ```
pub fn global_node_tick<N: Node>(global: &'static GlobalNode<N>) -> Result<(), LinkError> {
    critical_section::with(|cs| match global.borrow(cs).borrow_mut().as_mut() {
        Some(node) => node.tick(),
        None => Ok(()),
    })
}

/// Peripheral interrupt entry: handles the node's pending events.
///
/// # Returns
/// * The number of events handled; 0 before setup
pub fn global_node_service<N: Node>(global: &'static GlobalNode<N>) -> Result<u8, LinkError> {
    critical_section::with(|cs| match global.borrow(cs).borrow_mut().as_mut() {
        Some(node) => node.service(),
        None => Ok(0),
    })
}

/// One foreground pass, for the `main()` loop.
pub fn global_node_poll<N: Node>(global: &'static GlobalNode<N>) -> Result<(), LinkError> {
    critical_section::with(|cs| match global.borrow(cs).borrow_mut().as_mut() {
        Some(node) => node.poll(),
        None => Ok(()),
    })
}

/// Ticks the node and, if that raised an event, services it in the same
/// critical section. For targets where the timer is the only interrupt.
pub fn global_node_tick_and_service<N: Node>(
    global: &'static GlobalNode<N>,
) -> Result<u8, LinkError> {
    critical_section::with(|cs| match global.borrow(cs).borrow_mut().as_mut() {
        Some(node) => {
            node.tick()?;
            if node.has_pending() {
                node.service()
            } else {
                Ok(0)
            }
        }
        None => Ok(0),
    })
}

/// Reads a value off the global node, if it has been set up.
pub fn global_node_inspect<N: Node, R>(
    global: &'static GlobalNode<N>,
    f: impl FnOnce(&N) -> R,
) -> Option<R> {
    critical_section::with(|cs| global.borrow(cs).borrow().as_ref().map(f))
}
