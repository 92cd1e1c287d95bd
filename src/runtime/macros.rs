/// Declares a static global `LINK_NODE` protected by a `critical_section` mutex.
///
/// This macro creates a `static` singleton `LINK_NODE` that both `main()` and
/// the timer and peripheral interrupt handlers can reach.
///
/// # Arguments
/// - `$node`: The concrete node type, usually a [`Link`](crate::node::Link)
///
/// # Example
/// ```rust,ignore
/// init_link_node!(Link<MyMaster, MySlave>);
/// ```
#[macro_export]
macro_rules! init_link_node {
    ( $node:ty ) => {
        pub static LINK_NODE: $crate::runtime::GlobalNode<$node> =
            $crate::runtime::global_node_init::<$node>();
    };
}

/// Stores a node in the global `LINK_NODE` declared by `init_link_node!`.
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     let node = boot(&mut role_pin, make_master, make_slave).unwrap();
///     setup_link_node!(node);
/// }
/// ```
#[macro_export]
macro_rules! setup_link_node {
    ( $node:expr ) => {
        $crate::runtime::global_node_setup(&LINK_NODE, $node)
    };
}

/// Calls `tick()` on the global `LINK_NODE` if it has been set up.
///
/// Intended for the timer interrupt running at the peripheral clock rate.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     tick_link_node!().ok();
/// }
/// ```
#[macro_export]
macro_rules! tick_link_node {
    () => {
        $crate::runtime::global_node_tick(&LINK_NODE)
    };
}

/// Calls `service()` on the global `LINK_NODE` if it has been set up.
///
/// Intended for the peripheral interrupt.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn SPI0() {
///     service_link_node!().ok();
/// }
/// ```
#[macro_export]
macro_rules! service_link_node {
    () => {
        $crate::runtime::global_node_service(&LINK_NODE)
    };
}

/// Calls `poll()` on the global `LINK_NODE` if it has been set up.
#[macro_export]
macro_rules! poll_link_node {
    () => {
        $crate::runtime::global_node_poll(&LINK_NODE)
    };
}
