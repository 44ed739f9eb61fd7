// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

pub mod header;
pub mod multicast;
pub mod protocol;
