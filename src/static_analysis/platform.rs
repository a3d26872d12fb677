//! Development platform detection.

use crate::{error::ErrorKind, tree::DecompiledTree};
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::{fmt, path::Path, str::FromStr};

lazy_static! {
    static ref PHONEGAP_FILE_PATH_REGEX: Regex =
        Regex::new(r"temp/smali(?:_classes\d+)?/com(?:/adobe)?/phonegap").unwrap();
    static ref FLUTTER_FILE_PATH_REGEX: Regex =
        Regex::new("smali/io/flutter/embedding/engine/FlutterJNI.smali").unwrap();
}

/// Platform used to develop the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Native Android application written in Java.
    NativeJava,
    /// Native Android application written in Kotlin.
    NativeKotlin,
    /// Adobe PhoneGap.
    PhoneGap,
    /// Apache Cordova.
    Cordova,
    /// Xamarin.
    Xamarin,
    /// React Native.
    ReactNative,
    /// Flutter.
    Flutter,
}

impl Platform {
    /// Checks if the platform produces native Android code.
    pub fn is_native(self) -> bool {
        match self {
            Platform::NativeJava | Platform::NativeKotlin => true,
            Platform::PhoneGap
            | Platform::Cordova
            | Platform::Xamarin
            | Platform::ReactNative
            | Platform::Flutter => false,
        }
    }

    /// Gets the human readable name of the platform.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::NativeJava => "Java",
            Platform::NativeKotlin => "Kotlin",
            Platform::PhoneGap => "PhoneGap",
            Platform::Cordova => "Cordova",
            Platform::Xamarin => "Xamarin",
            Platform::ReactNative => "React Native",
            Platform::Flutter => "Flutter",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "java" | "nativejava" => Ok(Platform::NativeJava),
            "kotlin" | "nativekotlin" => Ok(Platform::NativeKotlin),
            "phonegap" => Ok(Platform::PhoneGap),
            "cordova" => Ok(Platform::Cordova),
            "xamarin" => Ok(Platform::Xamarin),
            "react native" | "reactnative" => Ok(Platform::ReactNative),
            "flutter" => Ok(Platform::Flutter),
            _ => Err(ErrorKind::Parse),
        }
    }
}

impl Serialize for Platform {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Detects the platform of the decompiled application.
///
/// Signatures overlap (a PhoneGap application also ships a `www` folder in its assets), so they
/// are tested in priority order and the first one found wins.
pub fn classify<T: DecompiledTree + ?Sized>(tree: &T) -> Result<Platform> {
    let platform = if is_phonegap(tree)? {
        Platform::PhoneGap
    } else if is_cordova(tree)? {
        Platform::Cordova
    } else if is_xamarin(tree)? {
        Platform::Xamarin
    } else if is_react_native(tree)? {
        Platform::ReactNative
    } else if is_flutter(tree)? {
        Platform::Flutter
    } else if is_kotlin(tree) {
        Platform::NativeKotlin
    } else {
        Platform::NativeJava
    };

    Ok(platform)
}

fn has_www<T: DecompiledTree + ?Sized>(tree: &T) -> Result<bool> {
    Ok(tree
        .children(Path::new("assets"))?
        .iter()
        .any(|f| f.name() == "www"))
}

fn is_phonegap<T: DecompiledTree + ?Sized>(tree: &T) -> Result<bool> {
    if !has_www(tree)? {
        return Ok(false);
    }
    if tree.exists(Path::new("smali/com/adobe/phonegap")) {
        return Ok(true);
    }

    any_entry(tree, |path, _| PHONEGAP_FILE_PATH_REGEX.is_match(path))
}

fn is_cordova<T: DecompiledTree + ?Sized>(tree: &T) -> Result<bool> {
    Ok(has_www(tree)? && tree.exists(Path::new("assets/www/cordova.js")))
}

fn is_xamarin<T: DecompiledTree + ?Sized>(tree: &T) -> Result<bool> {
    any_entry(tree, |_, name| {
        name == "libxamarin-app.so" || name == "libmonodroid.so"
    })
}

fn is_react_native<T: DecompiledTree + ?Sized>(tree: &T) -> Result<bool> {
    Ok(tree
        .children(Path::new("assets"))?
        .iter()
        .any(|f| f.name() == "index.android.bundle"))
}

fn is_flutter<T: DecompiledTree + ?Sized>(tree: &T) -> Result<bool> {
    any_entry(tree, |path, name| {
        name == "libflutter.so" || FLUTTER_FILE_PATH_REGEX.is_match(path)
    })
}

fn is_kotlin<T: DecompiledTree + ?Sized>(tree: &T) -> bool {
    tree.exists(Path::new("kotlin"))
}

/// Walks the tree until an entry satisfies the predicate, given its path and file name.
fn any_entry<T, F>(tree: &T, predicate: F) -> Result<bool>
where
    T: DecompiledTree + ?Sized,
    F: Fn(&str, &str) -> bool,
{
    for entry in tree.walk() {
        let entry = entry?;
        if predicate(entry.path_str(), entry.name()) {
            return Ok(true);
        }
    }
    Ok(false)
}
