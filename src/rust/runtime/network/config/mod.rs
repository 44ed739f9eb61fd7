// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod ethernet;

//==============================================================================
// Exports
//==============================================================================

pub use self::ethernet::EthernetConfig;
