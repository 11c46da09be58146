/// Declares the wire names of a protocol in one place.
///
/// Generates a module holding the protocol name (`PROTOCOL`), one constant
/// per method name, and a nested `qualified` module with the matching
/// fully-qualified names (`protocol + "." + method`), computed at compile
/// time so typed client stubs never build names at runtime.
///
/// ## Example
///
/// ```rust
/// wirebind::protocol_methods! {
///     pub mod account = "keybase.1.account" {
///         HAS_SERVER_KEYS => "hasServerKeys",
///         RESET_ACCOUNT => "resetAccount",
///     }
/// }
///
/// assert_eq!(account::PROTOCOL, "keybase.1.account");
/// assert_eq!(account::HAS_SERVER_KEYS, "hasServerKeys");
/// assert_eq!(
///     account::qualified::HAS_SERVER_KEYS,
///     "keybase.1.account.hasServerKeys"
/// );
/// ```
#[macro_export]
macro_rules! protocol_methods {
    (
        $vis:vis mod $module:ident = $protocol:literal {
            $($method_const:ident => $method:literal),* $(,)?
        }
    ) => {
        $vis mod $module {
            pub const PROTOCOL: &str = $protocol;

            $(pub const $method_const: &str = $method;)*

            /// Fully-qualified method names.
            pub mod qualified {
                $(pub const $method_const: &str = concat!($protocol, ".", $method);)*
            }
        }
    };
}
