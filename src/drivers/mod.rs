pub mod xbox_ble;
