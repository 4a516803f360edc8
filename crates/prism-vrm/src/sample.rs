//! A small built-in avatar
//!
//! Geometry-free but structurally complete: a humanoid chain with a
//! second node bound to `spine`, a three-primitive body mesh, a face mesh
//! with two morph targets, a plain glTF accessory, two spring bone groups
//! and a head collider. Used by `prism --sample` and by tests.

use serde_json::{json, Value};

pub const NODE_COUNT: usize = 10;

/// Node indices in the sample avatar
pub mod nodes {
    pub const ARMATURE: usize = 0;
    pub const HIPS: usize = 1;
    pub const SPINE: usize = 2;
    pub const HEAD: usize = 3;
    pub const HAIR_ROOT: usize = 4;
    pub const HAIR_TIP: usize = 5;
    pub const BODY: usize = 6;
    pub const FACE: usize = 7;
    pub const ACCESSORY: usize = 8;
    pub const SPINE_TWIST: usize = 9;
}

/// The sample avatar as a glTF JSON document
pub fn sample_avatar() -> Value {
    json!({
        "asset": { "version": "2.0", "generator": "prism sample" },
        "scene": 0,
        "scenes": [ { "name": "Scene", "nodes": [0, 6, 7, 8] } ],
        "nodes": [
            { "name": "Armature", "children": [1] },
            { "name": "Hips", "translation": [0.0, 1.0, 0.0], "children": [2] },
            { "name": "Spine", "translation": [0.0, 0.2, 0.0], "children": [3, 9] },
            { "name": "Head", "translation": [0.0, 0.3, 0.0], "children": [4] },
            { "name": "HairRoot", "translation": [0.0, 0.1, 0.0], "children": [5] },
            { "name": "HairTip", "translation": [0.0, 0.0, -0.1] },
            { "name": "Body", "mesh": 0 },
            { "name": "Face", "mesh": 1 },
            { "name": "Accessory", "mesh": 2, "translation": [0.1, 1.2, 0.0] },
            { "name": "SpineTwist", "translation": [0.0, 0.1, 0.0] }
        ],
        "meshes": [
            {
                "name": "Body",
                "primitives": [
                    { "attributes": {}, "material": 0 },
                    { "attributes": {}, "material": 1 },
                    { "attributes": {}, "material": 0 }
                ]
            },
            {
                "name": "Face",
                "primitives": [
                    { "attributes": {}, "material": 2, "targets": [ {}, {} ] }
                ],
                "weights": [0.0, 0.0]
            },
            {
                "name": "Accessory",
                "primitives": [ { "attributes": {}, "material": 3 } ]
            }
        ],
        "materials": [
            { "name": "Skin" },
            { "name": "Cloth" },
            { "name": "FaceMat" },
            { "name": "Metal", "pbrMetallicRoughness": { "baseColorFactor": [0.8, 0.8, 0.9, 1.0] } }
        ],
        "extensionsUsed": ["VRM"],
        "extensions": {
            "VRM": {
                "exporterVersion": "prism-sample-1.0",
                "meta": { "title": "Prism Sample", "version": "1.0", "author": "Prism" },
                "humanoid": {
                    "humanBones": [
                        { "bone": "hips", "node": 1 },
                        { "bone": "spine", "node": 2 },
                        { "bone": "head", "node": 3 },
                        { "bone": "spine", "node": 9 }
                    ]
                },
                "firstPerson": {
                    "firstPersonBone": 3,
                    "firstPersonBoneOffset": { "x": 0.0, "y": 0.06, "z": 0.0 },
                    "meshAnnotations": [
                        { "mesh": 1, "firstPersonFlag": "ThirdPersonOnly" },
                        { "mesh": 0, "firstPersonFlag": "Both" }
                    ]
                },
                "blendShapeMaster": {
                    "blendShapeGroups": [
                        { "name": "Neutral", "presetName": "neutral", "binds": [] },
                        { "name": "A", "presetName": "a", "binds": [ { "mesh": 1, "index": 0, "weight": 100 } ] },
                        { "name": "Joy", "presetName": "joy", "binds": [ { "mesh": 1, "index": 1, "weight": 50 } ] }
                    ]
                },
                "secondaryAnimation": {
                    "boneGroups": [
                        {
                            "comment": "hair",
                            "stiffiness": 1.0,
                            "gravityPower": 0.0,
                            "gravityDir": { "x": 0.0, "y": -1.0, "z": 0.0 },
                            "dragForce": 0.4,
                            "center": -1,
                            "hitRadius": 0.02,
                            "bones": [4],
                            "colliderGroups": [0]
                        },
                        {
                            "comment": "accessories",
                            "stiffiness": 0.5,
                            "gravityPower": 0.2,
                            "gravityDir": { "x": 0.0, "y": -1.0, "z": 0.0 },
                            "dragForce": 0.5,
                            "center": -1,
                            "hitRadius": 0.02,
                            "bones": [8],
                            "colliderGroups": []
                        }
                    ],
                    "colliderGroups": [
                        {
                            "node": 3,
                            "colliders": [ { "offset": { "x": 0.0, "y": 0.05, "z": 0.0 }, "radius": 0.08 } ]
                        }
                    ]
                },
                "materialProperties": [
                    { "name": "Skin", "shader": "VRM/MToon", "floatProperties": { "_OutlineWidthMode": 1.0 } },
                    { "name": "Cloth", "shader": "VRM/MToon" },
                    { "name": "FaceMat", "shader": "VRM/MToon" },
                    { "name": "Metal", "shader": "VRM_USE_GLTFSHADER" }
                ]
            }
        }
    })
}
