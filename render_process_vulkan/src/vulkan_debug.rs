/// Vulkan Debug Messenger - forwards validation layer messages to the engine logger
///
/// Messages are logged under the `rproc::vulkan` source at a severity
/// matching the Vulkan one, and counted per severity.

use ash::vk;
use render_process::rproc::log::LogSeverity;
use render_process::rproc::Engine;
use std::ffi::CStr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Cleared while the messenger is being destroyed
static FORWARDING: AtomicBool = AtomicBool::new(true);

static ERRORS: AtomicU32 = AtomicU32::new(0);
static WARNINGS: AtomicU32 = AtomicU32::new(0);

/// Validation messages seen since startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
}

/// Current validation statistics
pub fn get_validation_stats() -> ValidationStats {
    ValidationStats {
        errors: ERRORS.load(Ordering::Relaxed),
        warnings: WARNINGS.load(Ordering::Relaxed),
    }
}

pub(crate) fn enable_forwarding() {
    FORWARDING.store(true, Ordering::SeqCst);
}

pub(crate) fn disable_forwarding() {
    FORWARDING.store(false, Ordering::SeqCst);
}

/// Messenger create info routing every severity to `vulkan_debug_callback`
pub(crate) fn messenger_create_info<'a>() -> vk::DebugUtilsMessengerCreateInfoEXT<'a> {
    vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(vulkan_debug_callback))
}

fn severity_of(message_severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> LogSeverity {
    if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        LogSeverity::Error
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        LogSeverity::Warn
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        LogSeverity::Debug
    } else {
        LogSeverity::Trace
    }
}

/// Vulkan debug messenger callback
unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    if !FORWARDING.load(Ordering::SeqCst) || p_callback_data.is_null() {
        return vk::FALSE;
    }

    let callback_data = &*p_callback_data;
    let message_id_name = if callback_data.p_message_id_name.is_null() {
        "Unknown".into()
    } else {
        CStr::from_ptr(callback_data.p_message_id_name).to_string_lossy()
    };
    let message = if callback_data.p_message.is_null() {
        "No message".into()
    } else {
        CStr::from_ptr(callback_data.p_message).to_string_lossy()
    };

    let type_str = if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "General"
    };

    let severity = severity_of(message_severity);
    match severity {
        LogSeverity::Error => ERRORS.fetch_add(1, Ordering::Relaxed),
        LogSeverity::Warn => WARNINGS.fetch_add(1, Ordering::Relaxed),
        _ => 0,
    };

    Engine::log(
        severity,
        "rproc::vulkan",
        format!("[{}] {}: {}", type_str, message_id_name, message),
    );

    vk::FALSE
}
