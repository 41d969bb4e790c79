//! 核心宏定义

/// 为配置结构体实现 `Default`
///
/// ```rust
/// struct Limits {
///     max_sounds: usize,
///     label: String,
/// }
///
/// zhuobu::impl_default!(Limits {
///     max_sounds: 4,
///     label: String::from("sfx"),
/// });
///
/// assert_eq!(Limits::default().max_sounds, 4);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}
