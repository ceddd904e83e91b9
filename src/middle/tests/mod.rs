//! middle 模块测试
