#![macro_use]
#![allow(unused)]

// Logging goes through defmt when the feature is enabled, otherwise the
// arguments are only borrowed so call sites compile the same either way.

macro_rules! trace {
	($s:literal $(, $x:expr)* $(,)?) => {
		{
			#[cfg(feature = "defmt")]
			::defmt::trace!($s $(, $x)*);
			#[cfg(not(feature = "defmt"))]
			let _ = ($( & $x ),*);
		}
	};
}

macro_rules! debug {
	($s:literal $(, $x:expr)* $(,)?) => {
		{
			#[cfg(feature = "defmt")]
			::defmt::debug!($s $(, $x)*);
			#[cfg(not(feature = "defmt"))]
			let _ = ($( & $x ),*);
		}
	};
}

macro_rules! info {
	($s:literal $(, $x:expr)* $(,)?) => {
		{
			#[cfg(feature = "defmt")]
			::defmt::info!($s $(, $x)*);
			#[cfg(not(feature = "defmt"))]
			let _ = ($( & $x ),*);
		}
	};
}

macro_rules! warn {
	($s:literal $(, $x:expr)* $(,)?) => {
		{
			#[cfg(feature = "defmt")]
			::defmt::warn!($s $(, $x)*);
			#[cfg(not(feature = "defmt"))]
			let _ = ($( & $x ),*);
		}
	};
}
