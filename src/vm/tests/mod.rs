//! VM 模块测试
