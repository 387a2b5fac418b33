//! COM binding to the NSI2000 automation server.
//!
//! The server is created from its ProgID (`NSI2000.server` by default) and
//! navigated to `AppConnection.ScriptCommands`, which carries every property
//! and method in [`Property`] and [`Command`]. All members are reached by
//! late binding through `IDispatch`, one `GetIDsOfNames` + `Invoke` pair per
//! call.
//!
//! COM objects here live in a single-threaded apartment. `ComConsole` is
//! therefore neither `Send` nor `Sync` and must stay on the thread that
//! created it. A hung vendor call blocks that thread; there is no timeout.

#![allow(unsafe_code)]

use std::ptr;

use tracing::{debug, info};
use windows::core::{Interface, BSTR, GUID, HSTRING, IUnknown, PCWSTR, VARIANT};
use windows::Win32::System::Com::{
    CLSIDFromProgID, CoCreateInstance, CoInitializeEx, CoUninitialize, IDispatch,
    CLSCTX_LOCAL_SERVER, COINIT_APARTMENTTHREADED, DISPATCH_FLAGS, DISPATCH_METHOD,
    DISPATCH_PROPERTYGET, DISPATCH_PROPERTYPUT, DISPPARAMS, EXCEPINFO,
};
use windows::Win32::System::Ole::DISPID_PROPERTYPUT;
use windows::Win32::System::Variant::{
    VT_BOOL, VT_BSTR, VT_EMPTY, VT_I2, VT_I4, VT_INT, VT_NULL, VT_R4, VT_R8, VT_UI1,
};

use super::{Command, Console, ConsoleError, ConsoleResult, ConsoleValue, Property};

const LOCALE_USER_DEFAULT: u32 = 0x0400;

/// RAII guard for COM apartment initialisation on the current thread.
struct ComApartment;

impl ComApartment {
    fn enter() -> ConsoleResult<Self> {
        unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }
            .ok()
            .map_err(|e| ConsoleError::Unavailable(format!("CoInitializeEx: {e}")))?;
        Ok(ComApartment)
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}

/// Console bound to a running NSI2000 server.
pub struct ComConsole {
    prog_id: String,
    app: IDispatch,
    console: IDispatch,
    // Released after the interfaces above.
    _apartment: ComApartment,
}

impl ComConsole {
    /// Create (or attach to) the automation server registered under `prog_id`.
    pub fn connect(prog_id: &str) -> ConsoleResult<Self> {
        let apartment = ComApartment::enter()?;

        let clsid = unsafe { CLSIDFromProgID(&HSTRING::from(prog_id)) }
            .map_err(|e| ConsoleError::Unavailable(format!("{prog_id}: {e}")))?;
        let server: IDispatch = unsafe { CoCreateInstance(&clsid, None, CLSCTX_LOCAL_SERVER) }
            .map_err(|e| ConsoleError::Unavailable(format!("{prog_id}: {e}")))?;

        let app = object_property(&server, "AppConnection")?;
        let console = object_property(&app, "ScriptCommands")?;

        info!("Connected to NSI2000 automation server '{}'", prog_id);
        Ok(Self {
            prog_id: prog_id.to_string(),
            app,
            console,
            _apartment: apartment,
        })
    }
}

impl Console for ComConsole {
    fn get(&self, property: Property) -> ConsoleResult<ConsoleValue> {
        let result = dispatch(&self.console, property.name(), DISPATCH_PROPERTYGET, Vec::new())?;
        from_variant(property.name(), &result)
    }

    fn put(&self, property: Property, value: ConsoleValue) -> ConsoleResult<()> {
        dispatch(
            &self.console,
            property.name(),
            DISPATCH_PROPERTYPUT,
            vec![to_variant(&value)],
        )?;
        Ok(())
    }

    fn invoke(&self, command: Command, args: &[ConsoleValue]) -> ConsoleResult<ConsoleValue> {
        let args = args.iter().map(to_variant).collect();
        let result = dispatch(&self.console, command.name(), DISPATCH_METHOD, args)?;
        from_variant(command.name(), &result)
    }

    fn application_version(&self) -> ConsoleResult<String> {
        let result = dispatch(&self.app, "Version", DISPATCH_PROPERTYGET, Vec::new())?;
        from_variant("Version", &result)?.expect_text("Version")
    }

    fn describe(&self) -> String {
        format!("ComConsole({})", self.prog_id)
    }
}

fn object_property(target: &IDispatch, member: &str) -> ConsoleResult<IDispatch> {
    let value = dispatch(target, member, DISPATCH_PROPERTYGET, Vec::new())?;
    IUnknown::try_from(&value)
        .and_then(|unknown| unknown.cast::<IDispatch>())
        .map_err(|e| ConsoleError::call(member, format!("not an automation object: {e}")))
}

fn dispid(target: &IDispatch, member: &str) -> ConsoleResult<i32> {
    let name = HSTRING::from(member);
    let names = [PCWSTR(name.as_ptr())];
    let mut id = 0i32;
    unsafe {
        target.GetIDsOfNames(
            &GUID::zeroed(),
            names.as_ptr(),
            1,
            LOCALE_USER_DEFAULT,
            &mut id,
        )
    }
    .map_err(|e| ConsoleError::call(member, format!("unknown member: {e}")))?;
    Ok(id)
}

fn dispatch(
    target: &IDispatch,
    member: &str,
    flags: DISPATCH_FLAGS,
    mut args: Vec<VARIANT>,
) -> ConsoleResult<VARIANT> {
    let id = dispid(target, member)?;

    // IDispatch expects positional arguments last-to-first.
    args.reverse();
    let mut named_put = DISPID_PROPERTYPUT;
    let is_put = flags == DISPATCH_PROPERTYPUT;
    let params = DISPPARAMS {
        rgvarg: if args.is_empty() {
            ptr::null_mut()
        } else {
            args.as_mut_ptr()
        },
        rgdispidNamedArgs: if is_put {
            &mut named_put
        } else {
            ptr::null_mut()
        },
        cArgs: args.len() as u32,
        cNamedArgs: u32::from(is_put),
    };

    let mut result = VARIANT::default();
    let mut exception = EXCEPINFO::default();
    let mut arg_err = 0u32;
    unsafe {
        target.Invoke(
            id,
            &GUID::zeroed(),
            LOCALE_USER_DEFAULT,
            flags,
            &params,
            Some(&mut result as *mut VARIANT),
            Some(&mut exception as *mut EXCEPINFO),
            Some(&mut arg_err as *mut u32),
        )
    }
    .map_err(|e| {
        let description = exception.bstrDescription.to_string();
        if description.is_empty() {
            ConsoleError::call(member, e.to_string())
        } else {
            ConsoleError::call(member, description)
        }
    })?;

    debug!("IDispatch {} ({} args) ok", member, args.len());
    Ok(result)
}

fn to_variant(value: &ConsoleValue) -> VARIANT {
    match value {
        ConsoleValue::Empty => VARIANT::default(),
        ConsoleValue::Bool(v) => VARIANT::from(*v),
        ConsoleValue::Int(v) => VARIANT::from(*v),
        ConsoleValue::Float(v) => VARIANT::from(*v),
        ConsoleValue::Text(v) => VARIANT::from(BSTR::from(v.as_str())),
    }
}

fn from_variant(member: &str, value: &VARIANT) -> ConsoleResult<ConsoleValue> {
    let vt = unsafe { value.as_raw().Anonymous.Anonymous.vt };
    let convert_err = |e: windows::core::Error| ConsoleError::call(member, e.to_string());

    let converted = if vt == VT_EMPTY.0 || vt == VT_NULL.0 {
        ConsoleValue::Empty
    } else if vt == VT_BOOL.0 {
        ConsoleValue::Bool(bool::try_from(value).map_err(convert_err)?)
    } else if vt == VT_I2.0 || vt == VT_I4.0 || vt == VT_INT.0 || vt == VT_UI1.0 {
        ConsoleValue::Int(i32::try_from(value).map_err(convert_err)?)
    } else if vt == VT_R4.0 || vt == VT_R8.0 {
        ConsoleValue::Float(f64::try_from(value).map_err(convert_err)?)
    } else if vt == VT_BSTR.0 {
        ConsoleValue::Text(BSTR::try_from(value).map_err(convert_err)?.to_string())
    } else {
        return Err(ConsoleError::call(
            member,
            format!("unsupported VARIANT type {vt}"),
        ));
    };
    Ok(converted)
}
